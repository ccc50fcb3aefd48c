//! Most-viewed listing
//!
//! GET /api/popular-posts?limit=N - published posts ranked by views

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use postviews_kernel::limits::clamp_popular_limit;
use postviews_kernel::wire::{POPULAR_POSTS_PATH, PopularPostsResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::state::AppState;

/// Query string of the listing. `limit` is kept raw so that junk values fall
/// back to the default instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<String>,
}

impl PopularQuery {
    fn limit(&self) -> usize {
        clamp_popular_limit(self.limit.as_deref().and_then(|s| s.trim().parse().ok()))
    }
}

/// GET /api/popular-posts
///
/// A failing store yields an empty list; listing is decorative and must never
/// break the page that embeds it.
pub async fn popular_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PopularQuery>,
) -> Json<PopularPostsResponse> {
    let limit = query.limit();
    let posts = match state.store.most_viewed(limit).await {
        Ok(posts) => posts,
        Err(e) => {
            warn!(error = %e, "most-viewed listing failed");
            Vec::new()
        }
    };
    Json(PopularPostsResponse { posts })
}

/// Build the listing router sub-tree
pub fn popular_router() -> Router<Arc<AppState>> {
    Router::new().route(POPULAR_POSTS_PATH, get(popular_posts))
}
