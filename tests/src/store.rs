use async_trait::async_trait;
use postviews_gateway::backend::MemoryStore;
use postviews_kernel::{ContentStore, PostId, PostSummary, StoreError, ViewRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// One call made against a [`MockStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FetchViews(String),
    SetViews(String, u64),
    ListPosts,
    SetViewsBatch(usize),
    MostViewed(usize),
}

/// A scriptable content store
///
/// Posts live in a [`MemoryStore`]. On top of that the mock records every
/// call, can stall lookups and can fail every operation, so tests can drive
/// the gateway into its timeout and upstream-error paths.
#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<MemoryStore>,
    /// Every call made, in order
    pub call_history: Arc<RwLock<Vec<StoreCall>>>,
    lookup_delay: Arc<RwLock<Option<Duration>>>,
    failure: Arc<RwLock<Option<String>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a published post. Panics on an invalid id.
    pub fn with_post(self, id: &str, views: Option<u64>) -> Self {
        self.inner.insert(post_id(id), views);
        self
    }

    /// Delay every lookup by `delay` before answering.
    pub async fn set_lookup_delay(&self, delay: Duration) {
        *self.lookup_delay.write().await = Some(delay);
    }

    /// Make every operation fail with an upstream error carrying `message`.
    pub async fn fail_with(&self, message: &str) {
        *self.failure.write().await = Some(message.to_string());
    }

    /// Stored counter: `None` for a missing post, `Some(None)` when never
    /// counted.
    pub fn views_of(&self, id: &str) -> Option<Option<u64>> {
        self.inner.views_of(&post_id(id))
    }

    pub async fn history(&self) -> Vec<StoreCall> {
        self.call_history.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.call_history.read().await.len()
    }

    async fn enter(&self, call: StoreCall) -> Result<(), StoreError> {
        self.call_history.write().await.push(call);
        match self.failure.read().await.as_ref() {
            Some(message) => Err(StoreError::Upstream {
                status: 503,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn post_id(id: &str) -> PostId {
    PostId::parse(id).unwrap_or_else(|e| panic!("invalid test post id {id:?}: {e}"))
}

#[async_trait]
impl ContentStore for MockStore {
    async fn fetch_views(&self, id: &PostId) -> Result<Option<ViewRecord>, StoreError> {
        self.enter(StoreCall::FetchViews(id.to_string())).await?;
        let delay = *self.lookup_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.fetch_views(id).await
    }

    async fn set_views(&self, id: &PostId, views: u64) -> Result<(), StoreError> {
        self.enter(StoreCall::SetViews(id.to_string(), views)).await?;
        self.inner.set_views(id, views).await
    }

    async fn list_posts(&self) -> Result<Vec<PostSummary>, StoreError> {
        self.enter(StoreCall::ListPosts).await?;
        self.inner.list_posts().await
    }

    async fn set_views_batch(&self, updates: &[(PostId, u64)]) -> Result<(), StoreError> {
        self.enter(StoreCall::SetViewsBatch(updates.len())).await?;
        self.inner.set_views_batch(updates).await
    }

    async fn most_viewed(&self, limit: usize) -> Result<Vec<PostSummary>, StoreError> {
        self.enter(StoreCall::MostViewed(limit)).await?;
        self.inner.most_viewed(limit).await
    }
}

#[macro_export]
macro_rules! assert_store_calls {
    ($store:expr, $expected_count:expr) => {
        let count = $store.call_count().await;
        assert_eq!(
            count, $expected_count,
            "Expected {} store calls, but found {}",
            $expected_count, count
        );
    };
}
