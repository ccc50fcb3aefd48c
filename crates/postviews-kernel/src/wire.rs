//! JSON bodies of the view-count HTTP surface.

use serde::{Deserialize, Serialize};

use crate::store::PostSummary;

pub const INCREMENT_VIEWS_PATH: &str = "/api/increment-views";
pub const POPULAR_POSTS_PATH: &str = "/api/popular-posts";
pub const DEBUG_VIEWS_PATH: &str = "/api/debug-views";

/// `POST /api/increment-views` request body.
///
/// `post_id` stays a raw string here; the gateway validates it after the
/// rate-limit check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrementRequest {
    #[serde(rename = "postId", default)]
    pub post_id: Option<String>,
}

impl IncrementRequest {
    pub fn new(post_id: impl Into<String>) -> Self {
        Self {
            post_id: Some(post_id.into()),
        }
    }
}

/// Successful increment. The identifier is deliberately not echoed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementResponse {
    pub success: bool,
    pub views: u64,
}

/// Body of every rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// `GET /api/popular-posts` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularPostsResponse {
    pub posts: Vec<PostSummary>,
}

/// One entry of a debug seeding run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededViews {
    pub id: String,
    pub views: u64,
}

/// `POST /api/debug-views` success response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedResponse {
    pub success: bool,
    pub message: String,
    pub updates: Vec<SeededViews>,
}
