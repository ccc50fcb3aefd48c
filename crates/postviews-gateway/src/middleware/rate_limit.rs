//! Per-client rate limiting

use dashmap::DashMap;
use postviews_kernel::Clock;
use postviews_kernel::limits::{
    MAX_REQUESTS_PER_IP, RATE_LIMIT_CLEANUP_THRESHOLD, RATE_LIMIT_WINDOW,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Outcome of a single [`IpRateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Per-client IP rate limiter
///
/// Time is cut into fixed buckets of `window` length counted from the epoch.
/// Each `(address, bucket)` pair may be charged `max_requests` times; the
/// count is never carried into the next bucket. When the map grows past
/// `cleanup_threshold` entries, every entry of an earlier bucket is dropped.
///
/// State is process-local: separate gateway instances each keep their own
/// counts.
pub struct IpRateLimiter {
    counts: DashMap<(String, u64), u32>,
    max_requests: u32,
    window_ms: u64,
    cleanup_threshold: usize,
    clock: Arc<dyn Clock>,
}

impl IpRateLimiter {
    /// Create a new rate limiter.
    ///
    /// * `max_requests` - allowed requests per bucket, must be non-zero
    /// * `window`       - bucket width, must be at least one millisecond
    pub fn new(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            counts: DashMap::new(),
            max_requests,
            window_ms: u64::try_from(window.as_millis()).unwrap_or(u64::MAX).max(1),
            cleanup_threshold: RATE_LIMIT_CLEANUP_THRESHOLD,
            clock,
        }
    }

    /// Ten requests per thirty-minute bucket.
    pub fn with_defaults(clock: Arc<dyn Clock>) -> Self {
        Self::new(MAX_REQUESTS_PER_IP, RATE_LIMIT_WINDOW, clock)
    }

    pub fn with_cleanup_threshold(mut self, threshold: usize) -> Self {
        self.cleanup_threshold = threshold;
        self
    }

    /// Charge one request to `client_ip` in the current bucket.
    pub fn check(&self, client_ip: &str) -> RateDecision {
        let now = self.clock.now_millis();
        let bucket = now / self.window_ms;

        let decision = {
            let mut count = self
                .counts
                .entry((client_ip.to_string(), bucket))
                .or_insert(0);

            if *count >= self.max_requests {
                let bucket_end = bucket.saturating_add(1).saturating_mul(self.window_ms);
                RateDecision::Limited {
                    retry_after: Duration::from_millis(bucket_end.saturating_sub(now)),
                }
            } else {
                *count += 1;
                RateDecision::Allowed {
                    remaining: self.max_requests - *count,
                }
            }
        };

        if self.counts.len() > self.cleanup_threshold {
            self.drop_stale(bucket);
        }

        decision
    }

    /// Remove every entry that belongs to a bucket before the current one.
    pub fn sweep(&self) {
        let bucket = self.clock.now_millis() / self.window_ms;
        self.drop_stale(bucket);
    }

    /// Number of tracked `(address, bucket)` pairs.
    pub fn tracked(&self) -> usize {
        self.counts.len()
    }

    fn drop_stale(&self, current_bucket: u64) {
        let before = self.counts.len();
        self.counts.retain(|(_, bucket), _| *bucket >= current_bucket);
        debug!(
            removed = before.saturating_sub(self.counts.len()),
            remaining = self.counts.len(),
            "swept rate-limit buckets"
        );
    }
}
