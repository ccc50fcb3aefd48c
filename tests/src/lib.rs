//! postviews testing utilities
//!
//! Test doubles for the content store and a helper that serves the gateway
//! on a loopback port, so client and server can be exercised end to end
//! without a real CMS.

pub mod gateway;
pub mod store;

pub use gateway::TestGateway;
pub use store::{MockStore, StoreCall};
