//! Invocation wrapper around `POST /api/increment-views`.

use async_trait::async_trait;
use postviews_kernel::limits::CLIENT_REQUEST_TIMEOUT;
use postviews_kernel::wire::{INCREMENT_VIEWS_PATH, IncrementRequest, IncrementResponse};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::gate::ViewGate;

/// Something that can record one view of a post and report whether it was
/// counted.
#[async_trait]
pub trait ViewRecorder: Send + Sync {
    async fn record_view(&self, post_id: &str) -> bool;
}

/// What the endpoint made of one increment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IncrementOutcome {
    Counted(u64),
    /// 429: the server will not count this now.
    Throttled,
    /// 400 or 404: nothing to retry.
    Rejected(StatusCode),
    /// Any other status, or a 2xx that did not confirm the count.
    Failed(StatusCode),
}

/// Calls the increment endpoint on behalf of one client, consulting and
/// updating that client's [`ViewGate`].
pub struct ViewClient {
    http: Client,
    url: String,
    gate: Arc<ViewGate>,
}

impl ViewClient {
    /// Client for the gateway at `base_url` with the default 10-second
    /// request timeout.
    pub fn new(base_url: &str, gate: Arc<ViewGate>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, gate, CLIENT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        gate: Arc<ViewGate>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: format!("{}{}", base_url.trim_end_matches('/'), INCREMENT_VIEWS_PATH),
            gate,
        })
    }

    pub fn gate(&self) -> &ViewGate {
        &self.gate
    }

    /// Count one view of `post_id` if this client has not done so recently.
    ///
    /// Returns `true` only when the server confirmed the increment. Never
    /// fails; every problem is logged and reported as `false`.
    #[instrument(skip(self))]
    pub async fn increment_post_views(&self, post_id: &str) -> bool {
        if post_id.is_empty() {
            debug!("empty post id, skipping");
            return false;
        }
        if !self.gate.should_count_view(post_id) {
            debug!("within cooldown, skipping");
            return false;
        }

        match self.send(post_id).await {
            Ok(IncrementOutcome::Counted(views)) => {
                self.gate.mark_as_viewed(post_id);
                info!(views, "view counted");
                true
            }
            Ok(IncrementOutcome::Throttled) => {
                // Stop this client from retrying straight away.
                self.gate.mark_as_viewed(post_id);
                info!("rate limited by server, marked as viewed");
                false
            }
            Ok(IncrementOutcome::Rejected(status)) => {
                info!(%status, "increment rejected");
                false
            }
            Ok(IncrementOutcome::Failed(status)) => {
                warn!(%status, "increment failed, will retry on a later view");
                false
            }
            Err(e) if e.is_timeout() => {
                warn!("increment timed out, will retry on a later view");
                false
            }
            Err(e) => {
                warn!(error = %e, "increment request failed, will retry on a later view");
                false
            }
        }
    }

    async fn send(&self, post_id: &str) -> Result<IncrementOutcome, reqwest::Error> {
        let response = self
            .http
            .post(&self.url)
            .json(&IncrementRequest::new(post_id))
            .send()
            .await?;

        let status = response.status();
        let outcome = match status {
            StatusCode::TOO_MANY_REQUESTS => IncrementOutcome::Throttled,
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => IncrementOutcome::Rejected(status),
            s if s.is_success() => match response.json::<IncrementResponse>().await {
                Ok(body) if body.success => IncrementOutcome::Counted(body.views),
                _ => IncrementOutcome::Failed(status),
            },
            _ => IncrementOutcome::Failed(status),
        };
        Ok(outcome)
    }
}

#[async_trait]
impl ViewRecorder for ViewClient {
    async fn record_view(&self, post_id: &str) -> bool {
        self.increment_post_views(post_id).await
    }
}
