//! Fixed policy values for view counting.
//!
//! Gateway and client configuration default to these; the constants are the
//! single place the numbers are written down.

use std::time::Duration;

/// Longest accepted post identifier, in characters.
pub const MAX_POST_ID_LEN: usize = 200;

/// Minimum time between two counted views of one post from one client.
pub const VIEW_COOLDOWN: Duration = Duration::from_secs(30 * 60);

/// Delay between a post becoming visible and the view being attempted.
pub const VIEW_GRACE_DELAY: Duration = Duration::from_secs(2);

/// Client-side deadline for the increment request.
pub const CLIENT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Width of one per-IP rate-limit bucket.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(30 * 60);

/// Increment requests accepted per IP per bucket.
pub const MAX_REQUESTS_PER_IP: u32 = 10;

/// Rate-limit map size above which stale buckets are dropped.
pub const RATE_LIMIT_CLEANUP_THRESHOLD: usize = 1000;

/// Deadline for reading the current count from the store.
pub const STORE_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Absolute ceiling for a post's view counter.
pub const VIEW_CEILING: u64 = 1_000_000;

/// Default and maximum page size for the most-viewed listing.
pub const POPULAR_POSTS_DEFAULT: usize = 5;
pub const POPULAR_POSTS_MAX: usize = 50;

/// Range of the random counts written by the debug seeding route.
pub const SEED_VIEWS_MIN: u64 = 1;
pub const SEED_VIEWS_MAX: u64 = 1000;

/// Clamp a requested most-viewed page size into `1..=POPULAR_POSTS_MAX`.
pub fn clamp_popular_limit(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(POPULAR_POSTS_DEFAULT)
        .clamp(1, POPULAR_POSTS_MAX)
}
