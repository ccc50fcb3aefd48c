//! Per-client view gate.
//!
//! Remembers when this client last counted each post and refuses to count it
//! again inside the cooldown window. Without storage nothing is ever counted.

use postviews_kernel::limits::VIEW_COOLDOWN;
use postviews_kernel::{Clock, SystemClock};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::storage::{ViewStorage, view_key};

pub struct ViewGate {
    storage: Option<Arc<dyn ViewStorage>>,
    clock: Arc<dyn Clock>,
    cooldown: Duration,
}

impl ViewGate {
    /// Gate over `storage` with the system clock and the 30-minute cooldown.
    pub fn new(storage: Arc<dyn ViewStorage>) -> Self {
        Self {
            storage: Some(storage),
            clock: Arc::new(SystemClock),
            cooldown: VIEW_COOLDOWN,
        }
    }

    /// Gate for a context without persistent storage. Declines every view.
    pub fn detached() -> Self {
        Self {
            storage: None,
            clock: Arc::new(SystemClock),
            cooldown: VIEW_COOLDOWN,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Whether a view of `post_id` may be counted now. Never writes.
    pub fn should_count_view(&self, post_id: &str) -> bool {
        let Some(storage) = &self.storage else {
            debug!(post_id, "no view storage, not counting");
            return false;
        };

        let stored = match storage.get(&view_key(post_id)) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(post_id, error = %e, "view storage read failed, not counting");
                return false;
            }
        };

        // An unreadable timestamp is as good as none.
        let Some(last) = stored.and_then(|s| s.trim().parse::<u64>().ok()) else {
            return true;
        };

        let elapsed = self.clock.now_millis().saturating_sub(last);
        let cooldown = u64::try_from(self.cooldown.as_millis()).unwrap_or(u64::MAX);
        if elapsed < cooldown {
            debug!(post_id, elapsed_ms = elapsed, "viewed recently, not counting");
            return false;
        }
        true
    }

    /// Record `post_id` as viewed now, replacing any earlier timestamp.
    pub fn mark_as_viewed(&self, post_id: &str) {
        let Some(storage) = &self.storage else {
            return;
        };
        let now = self.clock.now_millis().to_string();
        if let Err(e) = storage.set(&view_key(post_id), &now) {
            warn!(post_id, error = %e, "failed to record view timestamp");
        }
    }
}
