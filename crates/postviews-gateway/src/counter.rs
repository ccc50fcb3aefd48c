//! The view-count increment operation.
//!
//! ```text
//! received → rate-limit-check → {rejected | validated}
//!          → lookup → {not-found | timeout-error | found}
//!          → increment-compute → {abuse-rejected | proceed}
//!          → write → responded
//! ```
//!
//! The rate-limit check comes first so that abusive callers never reach the
//! store. Nothing is retried here; clients retry on a later view.
//!
//! The read-modify-write is not transactional: two concurrent increments of
//! one post may both read `n` and both write `n + 1`.

use postviews_kernel::{ContentStore, PostId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{
    GatewayError, GatewayResult, MSG_POST_ID_FORMAT, MSG_POST_ID_REQUIRED, MSG_TOO_MANY_REQUESTS,
    MSG_VIEW_LIMIT,
};
use crate::middleware::{IpRateLimiter, RateDecision};

/// Increments post view counters on behalf of HTTP callers.
pub struct ViewCounter {
    store: Arc<dyn ContentStore>,
    limiter: Arc<IpRateLimiter>,
    lookup_timeout: Duration,
    view_ceiling: u64,
}

impl ViewCounter {
    pub fn new(
        store: Arc<dyn ContentStore>,
        limiter: Arc<IpRateLimiter>,
        lookup_timeout: Duration,
        view_ceiling: u64,
    ) -> Self {
        Self {
            store,
            limiter,
            lookup_timeout,
            view_ceiling,
        }
    }

    pub fn limiter(&self) -> &IpRateLimiter {
        &self.limiter
    }

    /// Count one view of `raw_post_id` for the caller at `client_ip`.
    ///
    /// `raw_post_id` is `None` when the body carried no usable `postId`.
    /// Returns the new counter value.
    pub async fn increment(
        &self,
        client_ip: &str,
        raw_post_id: Option<&str>,
    ) -> GatewayResult<u64> {
        if let RateDecision::Limited { retry_after } = self.limiter.check(client_ip) {
            info!(client_ip, "rate limited view increment");
            return Err(GatewayError::RateLimited {
                message: MSG_TOO_MANY_REQUESTS,
                retry_after: Some(retry_after),
            });
        }

        let raw = raw_post_id
            .filter(|s| !s.is_empty())
            .ok_or(GatewayError::InvalidInput(MSG_POST_ID_REQUIRED))?;
        let post_id = PostId::parse(raw).map_err(|e| {
            info!(client_ip, reason = %e, "rejected post id");
            GatewayError::InvalidInput(MSG_POST_ID_FORMAT)
        })?;

        let record = tokio::time::timeout(self.lookup_timeout, self.store.fetch_views(&post_id))
            .await
            .map_err(|_| GatewayError::Timeout(self.lookup_timeout))??
            .ok_or(GatewayError::NotFound)?;

        let current = record.current();
        let next = current.saturating_add(1);
        if next > self.view_ceiling {
            warn!(%post_id, views = next, "suspicious view count, refusing increment");
            return Err(GatewayError::RateLimited {
                message: MSG_VIEW_LIMIT,
                retry_after: None,
            });
        }

        self.store.set_views(&post_id, next).await?;

        info!(%post_id, client_ip, from = current, to = next, "incremented views");
        Ok(next)
    }
}
