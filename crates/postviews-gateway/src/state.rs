//! Shared application state for the gateway server

use crate::counter::ViewCounter;
use postviews_kernel::ContentStore;
use std::sync::Arc;

/// State shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Increment pipeline, owning the per-IP rate limiter
    pub counter: Arc<ViewCounter>,
    /// Store used by the listing and seeding routes
    pub store: Arc<dyn ContentStore>,
}

impl AppState {
    pub fn new(counter: Arc<ViewCounter>, store: Arc<dyn ContentStore>) -> Self {
        Self { counter, store }
    }
}
