//! Grace-delayed view tracking.
//!
//! A post becomes visible, [`ViewTracker::track`] schedules one view after
//! the grace delay, and dropping the returned [`TrackedView`] before then
//! cancels it. Brief accidental visits are never counted.

use postviews_kernel::limits::VIEW_GRACE_DELAY;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::ViewRecorder;

pub struct ViewTracker {
    recorder: Arc<dyn ViewRecorder>,
    grace_delay: Duration,
}

impl ViewTracker {
    pub fn new(recorder: Arc<dyn ViewRecorder>) -> Self {
        Self {
            recorder,
            grace_delay: VIEW_GRACE_DELAY,
        }
    }

    pub fn with_grace_delay(mut self, grace_delay: Duration) -> Self {
        self.grace_delay = grace_delay;
        self
    }

    /// Schedule a view of `post_id`. Returns `None` (and schedules nothing)
    /// for an empty id.
    ///
    /// Must be called from within a tokio runtime.
    pub fn track(&self, post_id: &str) -> Option<TrackedView> {
        if post_id.is_empty() {
            debug!("empty post id, not tracking");
            return None;
        }

        let recorder = self.recorder.clone();
        let grace_delay = self.grace_delay;
        let post_id = post_id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace_delay).await;
            recorder.record_view(&post_id).await
        });

        Some(TrackedView {
            handle: Some(handle),
        })
    }
}

/// A pending view. Dropping it aborts the view if it has not fired yet.
pub struct TrackedView {
    handle: Option<JoinHandle<bool>>,
}

impl TrackedView {
    /// Wait for the view to fire. `Some(counted)` once the recorder ran,
    /// `None` if the task was cancelled or panicked.
    pub async fn finished(mut self) -> Option<bool> {
        let handle = self.handle.take()?;
        handle.await.ok()
    }

    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TrackedView {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
