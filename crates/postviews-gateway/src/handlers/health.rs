//! Liveness endpoint
//!
//! GET /health - server is up

use axum::{Json, Router, response::IntoResponse, routing::get};
use serde_json::json;
use std::sync::Arc;

use crate::state::AppState;

/// GET /health - liveness probe
///
/// Always returns 200 OK while the process is alive. The store is not probed.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "postviews-gateway" }))
}

/// Build the health router sub-tree
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
