//! Request-path helpers shared by the handlers.

pub mod client_ip;
pub mod headers;
pub mod rate_limit;

pub use client_ip::client_ip;
pub use headers::{increment_cors, reject_bare_options, security_headers};
pub use rate_limit::{IpRateLimiter, RateDecision};
