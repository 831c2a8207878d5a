use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no product with id `{id}`")]
    NotFound { id: String },
}
