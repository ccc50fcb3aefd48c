//! Gateway error types
//!
//! Every variant maps onto one HTTP status. Response bodies carry a fixed,
//! caller-safe message; store errors, timeouts and identifiers only reach the
//! log.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use postviews_kernel::StoreError;
use postviews_kernel::wire::ErrorBody;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

pub const MSG_POST_ID_REQUIRED: &str = "Valid post ID is required";
pub const MSG_POST_ID_FORMAT: &str = "Invalid post ID format";
pub const MSG_POST_NOT_FOUND: &str = "Post not found";
pub const MSG_TOO_MANY_REQUESTS: &str = "Too many requests. Please try again later.";
pub const MSG_VIEW_LIMIT: &str = "View count limit reached";
pub const MSG_INTERNAL: &str = "Internal server error";
pub const MSG_METHOD_NOT_ALLOWED: &str = "Method not allowed";

/// Gateway-level errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("post not found")]
    NotFound,

    #[error("rate limited: {message}")]
    RateLimited {
        message: &'static str,
        retry_after: Option<Duration>,
    },

    #[error("store lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Timeout(_) | GatewayError::Store(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            GatewayError::InvalidInput(msg) => *msg,
            GatewayError::NotFound => MSG_POST_NOT_FOUND,
            GatewayError::RateLimited { message, .. } => *message,
            GatewayError::Timeout(_) | GatewayError::Store(_) | GatewayError::Internal(_) => {
                MSG_INTERNAL
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let mut response =
            (status, Json(ErrorBody::new(self.public_message()))).into_response();

        if let GatewayError::RateLimited {
            retry_after: Some(wait),
            ..
        } = &self
        {
            let secs = wait.as_secs().max(1);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }

        response
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
