use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::money::Money;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One catalog entry. Immutable for the lifetime of the snapshot it belongs
/// to; refreshing the catalog replaces whole snapshots, never single entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub picture: String,
    pub price: Money,
}
