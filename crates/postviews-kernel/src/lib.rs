//! `postviews-kernel` - contracts shared by the view-count gateway and its
//! clients.
//!
//! No network I/O lives here; only the optional `config` module touches the
//! filesystem. The kernel defines:
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`PostId`] | validated content-item identifier |
//! | [`ContentStore`] | read/write contract for the headless CMS |
//! | [`Clock`] | injectable wall clock ([`SystemClock`], [`ManualClock`]) |
//! | [`wire`] | JSON bodies exchanged over `/api/increment-views` |
//! | [`limits`] | cooldowns, windows and ceilings |
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                 postviews-kernel                       │
//! │  PostId  ContentStore  Clock  wire::*  limits::*       │
//! └──────────────┬─────────────────────────┬───────────────┘
//!                │                         │
//! ┌──────────────▼───────────┐ ┌───────────▼───────────────┐
//! │   postviews-gateway      │ │   postviews-client        │
//! │   axum endpoint, IP      │ │   ViewGate, ViewClient,   │
//! │   limiter, Sanity store  │ │   ViewTracker             │
//! └──────────────────────────┘ └───────────────────────────┘
//! ```

pub mod clock;
#[cfg(feature = "config")]
pub mod config;
pub mod limits;
pub mod post_id;
pub mod store;
pub mod wire;

pub use clock::{Clock, ManualClock, SystemClock};
pub use post_id::{PostId, PostIdError};
pub use store::{ContentStore, PostSummary, StoreError, ViewRecord};
