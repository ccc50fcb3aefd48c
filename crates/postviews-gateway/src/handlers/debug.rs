//! Development-only counter seeding
//!
//! POST /api/debug-views - give every published post a random view count
//!
//! Mounted only when `enable_debug_routes` is set.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use postviews_kernel::PostId;
use postviews_kernel::limits::{SEED_VIEWS_MAX, SEED_VIEWS_MIN};
use postviews_kernel::wire::{DEBUG_VIEWS_PATH, SeedResponse, SeededViews};
use rand::Rng;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::state::AppState;

/// Pick a mock counter for each post.
fn mock_counts(ids: Vec<PostId>) -> Vec<(PostId, u64)> {
    let mut rng = rand::thread_rng();
    ids.into_iter()
        .map(|id| (id, rng.gen_range(SEED_VIEWS_MIN..=SEED_VIEWS_MAX)))
        .collect()
}

fn seed_failed() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": "Failed to update views" })),
    )
        .into_response()
}

/// POST /api/debug-views
///
/// All counters are committed in a single batch; on failure nothing changes.
pub async fn seed_views(State(state): State<Arc<AppState>>) -> Response {
    let posts = match state.store.list_posts().await {
        Ok(posts) => posts,
        Err(e) => {
            error!(error = %e, "listing posts for seeding failed");
            return seed_failed();
        }
    };

    let updates = mock_counts(posts.into_iter().map(|p| p.id).collect());

    if let Err(e) = state.store.set_views_batch(&updates).await {
        error!(error = %e, "seeding view counts failed");
        return seed_failed();
    }

    info!(posts = updates.len(), "seeded mock view counts");
    Json(SeedResponse {
        success: true,
        message: format!("Updated {} posts with mock view counts", updates.len()),
        updates: updates
            .into_iter()
            .map(|(id, views)| SeededViews {
                id: id.to_string(),
                views,
            })
            .collect(),
    })
    .into_response()
}

/// Build the seeding router sub-tree
pub fn debug_router() -> Router<Arc<AppState>> {
    Router::new().route(DEBUG_VIEWS_PATH, post(seed_views))
}
