//! `postviews-client` - the client half of the view counter.
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`ViewGate`] | per-client cooldown over persisted timestamps |
//! | [`ViewStorage`] | where timestamps live ([`MemoryStorage`], [`FileStorage`]) |
//! | [`ViewClient`] | calls `POST /api/increment-views` and updates the gate |
//! | [`ViewTracker`] | counts a view only after the grace delay |
//!
//! ```rust,no_run
//! use postviews_client::{FileStorage, ViewClient, ViewGate, ViewTracker};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let gate = Arc::new(ViewGate::new(Arc::new(FileStorage::new("views.json"))));
//! let client = Arc::new(ViewClient::new("http://localhost:3000", gate)?);
//! let tracker = ViewTracker::new(client);
//!
//! if let Some(view) = tracker.track("abc123") {
//!     view.finished().await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod gate;
pub mod storage;
pub mod tracker;

pub use client::{ViewClient, ViewRecorder};
pub use gate::ViewGate;
pub use storage::{FileStorage, MemoryStorage, StorageError, ViewStorage, view_key};
pub use tracker::{TrackedView, ViewTracker};
