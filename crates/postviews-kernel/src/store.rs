//! Content-store contract.
//!
//! The headless CMS is an external collaborator. The gateway talks to it only
//! through [`ContentStore`], whose methods return typed values decoded at the
//! store-client boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::post_id::PostId;

/// The view-count projection of a post document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewRecord {
    /// `None` when the document has never been counted.
    #[serde(default)]
    pub views: Option<u64>,
}

impl ViewRecord {
    pub fn current(&self) -> u64 {
        self.views.unwrap_or(0)
    }
}

/// Listing projection used by the most-viewed and seeding operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: PostId,
    pub title: String,
    pub slug: String,
    pub views: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Store-layer failures. Never shown to HTTP callers verbatim.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(String),

    #[error("store returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("store response did not match the expected shape: {0}")]
    Decode(String),

    #[error("store rejected the mutation: {0}")]
    Mutation(String),

    #[error("store is missing a write credential")]
    MissingCredential,
}

/// Read/write access to post view counters.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read the counter of one post. `Ok(None)` when no such post exists.
    async fn fetch_views(&self, id: &PostId) -> Result<Option<ViewRecord>, StoreError>;

    /// Overwrite the counter of one post.
    async fn set_views(&self, id: &PostId, views: u64) -> Result<(), StoreError>;

    /// Every published post (one with a slug).
    async fn list_posts(&self) -> Result<Vec<PostSummary>, StoreError>;

    /// Overwrite many counters in one atomic transaction.
    async fn set_views_batch(&self, updates: &[(PostId, u64)]) -> Result<(), StoreError>;

    /// Published posts with a non-zero counter, most viewed first, at most
    /// `limit` of them.
    async fn most_viewed(&self, limit: usize) -> Result<Vec<PostSummary>, StoreError>;
}

/// Order posts the way the most-viewed listing does: views descending, then
/// newest first. Posts without views are dropped.
pub fn rank_by_views(mut posts: Vec<PostSummary>, limit: usize) -> Vec<PostSummary> {
    posts.retain(|p| p.views > 0);
    posts.sort_by(|a, b| {
        b.views
            .cmp(&a.views)
            .then_with(|| b.published_at.cmp(&a.published_at))
    });
    posts.truncate(limit);
    posts
}
