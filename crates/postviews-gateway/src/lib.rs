//! `postviews-gateway` - rate-limited view-count endpoint.
//!
//! This crate provides the concrete implementations of the contracts defined
//! in `postviews-kernel`:
//!
//! | Kernel contract | Implementation |
//! |----------------|----------------|
//! | [`ContentStore`] | [`backend::SanityStore`], [`backend::MemoryStore`] |
//! | [`Clock`] | per-IP buckets in [`middleware::IpRateLimiter`] |
//!
//! The [`server::GatewayServer`] wires everything together into an axum HTTP
//! service.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use postviews_gateway::config::GatewayConfig;
//! use postviews_gateway::server::GatewayServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = GatewayConfig::load()?;
//!     GatewayServer::new(config).start().await
//! }
//! ```
//!
//! [`ContentStore`]: postviews_kernel::ContentStore
//! [`Clock`]: postviews_kernel::Clock

pub mod backend;
pub mod config;
pub mod counter;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod state;

pub use config::GatewayConfig;
pub use counter::ViewCounter;
pub use error::{GatewayError, GatewayResult};
pub use server::{GatewayServer, build_router};
pub use state::AppState;
