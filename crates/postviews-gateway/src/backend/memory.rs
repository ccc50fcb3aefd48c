//! In-memory [`ContentStore`] implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use postviews_kernel::store::rank_by_views;
use postviews_kernel::{ContentStore, PostId, PostSummary, StoreError, ViewRecord};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
struct StoredPost {
    title: String,
    slug: Option<String>,
    views: Option<u64>,
    published_at: Option<DateTime<Utc>>,
}

/// [`ContentStore`] backed by a `BTreeMap`.
///
/// Used for local runs and tests. Every trait call is counted, so tests can
/// assert that a rejected request never reached the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: RwLock<BTreeMap<PostId, StoredPost>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a published post whose slug and title equal its id.
    pub fn with_post(self, id: PostId, views: Option<u64>) -> Self {
        self.insert(id, views);
        self
    }

    /// Builder: add a post that has no slug yet (a draft).
    pub fn with_draft(self, id: PostId, views: Option<u64>) -> Self {
        self.posts.write().insert(
            id.clone(),
            StoredPost {
                title: id.to_string(),
                slug: None,
                views,
                published_at: None,
            },
        );
        self
    }

    pub fn insert(&self, id: PostId, views: Option<u64>) {
        self.insert_published(id, views, None);
    }

    pub fn insert_published(
        &self,
        id: PostId,
        views: Option<u64>,
        published_at: Option<DateTime<Utc>>,
    ) {
        self.posts.write().insert(
            id.clone(),
            StoredPost {
                title: id.to_string(),
                slug: Some(id.to_string()),
                views,
                published_at,
            },
        );
    }

    /// Raw counter of a post: `None` if the post is missing, `Some(None)` if
    /// it was never counted.
    pub fn views_of(&self, id: &PostId) -> Option<Option<u64>> {
        self.posts.read().get(id).map(|p| p.views)
    }

    /// Number of [`ContentStore`] calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn published(&self) -> Vec<PostSummary> {
        self.posts
            .read()
            .iter()
            .filter_map(|(id, post)| {
                post.slug.as_ref().map(|slug| PostSummary {
                    id: id.clone(),
                    title: post.title.clone(),
                    slug: slug.clone(),
                    views: post.views.unwrap_or(0),
                    published_at: post.published_at,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch_views(&self, id: &PostId) -> Result<Option<ViewRecord>, StoreError> {
        self.touch();
        Ok(self
            .posts
            .read()
            .get(id)
            .map(|p| ViewRecord { views: p.views }))
    }

    async fn set_views(&self, id: &PostId, views: u64) -> Result<(), StoreError> {
        self.touch();
        match self.posts.write().get_mut(id) {
            Some(post) => {
                post.views = Some(views);
                Ok(())
            }
            None => Err(StoreError::Mutation(format!("document {id} does not exist"))),
        }
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>, StoreError> {
        self.touch();
        Ok(self.published())
    }

    async fn set_views_batch(&self, updates: &[(PostId, u64)]) -> Result<(), StoreError> {
        self.touch();
        let mut posts = self.posts.write();
        // All-or-nothing, like a store transaction.
        if let Some((missing, _)) = updates.iter().find(|(id, _)| !posts.contains_key(id)) {
            return Err(StoreError::Mutation(format!(
                "document {missing} does not exist"
            )));
        }
        for (id, views) in updates {
            if let Some(post) = posts.get_mut(id) {
                post.views = Some(*views);
            }
        }
        Ok(())
    }

    async fn most_viewed(&self, limit: usize) -> Result<Vec<PostSummary>, StoreError> {
        self.touch();
        Ok(rank_by_views(self.published(), limit))
    }
}
