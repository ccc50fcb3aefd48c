//! Client address extraction for rate limiting.

use axum::http::HeaderMap;

/// Partition key used when no forwarding header identifies the caller.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// First entry of `x-forwarded-for`, else `x-real-ip`, else `"unknown"`.
///
/// Headers are trusted as set by the fronting proxy. Every caller without
/// them shares the single `"unknown"` bucket.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(first) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return first.to_string();
    }

    if let Some(real) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return real.to_string();
    }

    UNKNOWN_CLIENT.to_string()
}
