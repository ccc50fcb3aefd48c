//! View-count increment endpoint
//!
//! POST /api/increment-views - count one view of a post

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::from_fn,
    response::IntoResponse,
    routing::post,
};
use postviews_kernel::wire::{ErrorBody, INCREMENT_VIEWS_PATH, IncrementRequest, IncrementResponse};
use std::sync::Arc;

use crate::error::{GatewayError, MSG_METHOD_NOT_ALLOWED};
use crate::middleware::{client_ip, increment_cors, reject_bare_options};
use crate::state::AppState;

/// Pull the raw `postId` out of a request body.
///
/// Anything that is not a JSON object with a string `postId` yields `None`,
/// which the counter reports as a missing identifier.
fn raw_post_id(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<IncrementRequest>(body)
        .ok()
        .and_then(|req| req.post_id)
}

/// POST /api/increment-views
///
/// The body is read as raw bytes so that a malformed payload still passes the
/// rate limiter before being rejected.
pub async fn increment_views(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IncrementResponse>, GatewayError> {
    let ip = client_ip(&headers);
    let post_id = raw_post_id(&body);
    let views = state.counter.increment(&ip, post_id.as_deref()).await?;
    Ok(Json(IncrementResponse {
        success: true,
        views,
    }))
}

/// Any method other than `POST` (and CORS preflight) on the increment path.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new(MSG_METHOD_NOT_ALLOWED)),
    )
}

/// Build the increment router sub-tree
///
/// Only real preflights reach the CORS layer; a bare `OPTIONS` is a 405 like
/// every other method.
pub fn views_router() -> Router<Arc<AppState>> {
    Router::new().route(
        INCREMENT_VIEWS_PATH,
        post(increment_views)
            .fallback(method_not_allowed)
            .layer(increment_cors())
            .layer(from_fn(reject_bare_options)),
    )
}
