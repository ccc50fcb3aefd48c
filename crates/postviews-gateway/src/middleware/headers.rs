//! Response hardening and CORS layers for `/api/*`.

use axum::extract::Request;
use axum::http::{
    HeaderName, HeaderValue, Method,
    header::{
        ACCESS_CONTROL_REQUEST_METHOD, CONTENT_TYPE, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
        X_FRAME_OPTIONS, X_XSS_PROTECTION,
    },
};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::views::method_not_allowed;

/// Path prefix whose responses carry [`SECURITY_HEADERS`].
pub const API_PREFIX: &str = "/api/";

/// Hardening headers stamped onto every API response.
pub const SECURITY_HEADERS: [(HeaderName, &str); 4] = [
    (X_FRAME_OPTIONS, "DENY"),
    (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (REFERRER_POLICY, "strict-origin-when-cross-origin"),
    (X_XSS_PROTECTION, "1; mode=block"),
];

/// Stamp [`SECURITY_HEADERS`] onto every response under [`API_PREFIX`],
/// unmatched paths and 405s included.
///
/// Install with `axum::middleware::from_fn` on the outermost router so the
/// fallback is covered too.
pub async fn security_headers(req: Request, next: Next) -> Response {
    let is_api = req.uri().path().starts_with(API_PREFIX);
    let mut response = next.run(req).await;
    if is_api {
        let headers = response.headers_mut();
        for (name, value) in SECURITY_HEADERS {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }
    response
}

/// A CORS preflight is an `OPTIONS` naming the method it wants to use.
fn is_preflight(req: &Request) -> bool {
    req.method() == Method::OPTIONS && req.headers().contains_key(ACCESS_CONTROL_REQUEST_METHOD)
}

/// Answer a bare `OPTIONS` with 405 before the CORS layer can treat it as a
/// preflight.
pub async fn reject_bare_options(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS && !is_preflight(&req) {
        return method_not_allowed().await.into_response();
    }
    next.run(req).await
}

/// CORS policy of the increment endpoint: any origin, `POST` only, JSON body.
pub fn increment_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([CONTENT_TYPE])
}
