use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use shelf_core::{CatalogError, CatalogStore, Product};

#[derive(Clone)]
pub struct CatalogApiState {
    store: Arc<CatalogStore>,
}

#[derive(Debug, Serialize)]
pub struct ListProductsResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct SearchProductsResponse {
    pub results: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

pub fn router(store: Arc<CatalogStore>) -> Router {
    Router::new()
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/search", get(search_products))
        .route("/api/v1/products/{id}", get(get_product))
        .with_state(CatalogApiState { store })
}

pub async fn list_products(State(state): State<CatalogApiState>) -> Json<ListProductsResponse> {
    let snapshot = state.store.list_products().await;
    Json(ListProductsResponse { products: snapshot.as_ref().clone() })
}

pub async fn get_product(
    Path(id): Path<String>,
    State(state): State<CatalogApiState>,
) -> Result<Json<Product>, (StatusCode, Json<ApiError>)> {
    state.store.get_product(&id).await.map(Json).map_err(|error| match error {
        CatalogError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, Json(ApiError { error: error.to_string() }))
        }
    })
}

pub async fn search_products(
    State(state): State<CatalogApiState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchProductsResponse> {
    Json(SearchProductsResponse { results: state.store.search_products(&params.q).await })
}
