use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub checked_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WatchUnsupported {
    pub error: &'static str,
}

pub fn router() -> Router {
    Router::new().route("/health", get(check)).route("/health/watch", get(watch))
}

/// The catalog has no dependencies worth probing and no degraded states;
/// answering at all is the whole liveness contract.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "SERVING", checked_at: Utc::now().to_rfc3339() })
}

/// Streaming health is not offered; callers fail over to polling `/health`.
pub async fn watch() -> (StatusCode, Json<WatchUnsupported>) {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(WatchUnsupported { error: "health watch is not supported; poll /health instead" }),
    )
}
