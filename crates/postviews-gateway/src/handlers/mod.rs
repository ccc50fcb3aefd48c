//! Request handlers for the view-count API

pub mod debug;
pub mod health;
pub mod popular;
pub mod views;

pub use debug::debug_router;
pub use health::health_router;
pub use popular::popular_router;
pub use views::views_router;
