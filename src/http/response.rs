//! Response finishing.
//!
//! # Responsibilities
//! - Render gateway failures as terse text/plain responses
//! - Stamp the correlation id on every response the handler produces
//! - Expose the consumer's retry hint to upstream layers
//!
//! # Design Decisions
//! - Successful and failed requests leave through the same path
//! - Full failure detail stays in the logs; only status and message cross the wire

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::error::GatewayError;

/// Header carrying `FAIL` or `RETRY` on consumer failures.
pub const RETRY_HEADER: &str = "x-feed-retry";

/// Render `err` for the caller. `resource` is the requested path.
pub fn failure_response(err: &GatewayError, resource: &str) -> Response {
    let status = err.status();
    let message = err.client_message(resource);

    match err {
        GatewayError::Decode(_) if status == StatusCode::INTERNAL_SERVER_ERROR => {
            tracing::error!(status = status.as_u16(), error = %err, "Failed to decode request");
        }
        GatewayError::Decode(_) => {
            tracing::warn!(status = status.as_u16(), error = %err, "Rejected request");
        }
        GatewayError::Encode(_) => {
            tracing::error!(status = status.as_u16(), error = %err, "Failed to encode consumer output");
        }
        // Already logged with its causes by the dispatcher.
        GatewayError::Dispatch(_) => {}
    }

    let mut response = (status, message).into_response();
    if let Some(retry) = err.retry() {
        response
            .headers_mut()
            .insert(HeaderName::from_static(RETRY_HEADER), HeaderValue::from_static(retry.as_str()));
    }
    response
}

/// Set `header: correlation_id` on the response.
pub fn with_correlation(mut response: Response, header: &HeaderName, correlation_id: &str) -> Response {
    match HeaderValue::from_str(correlation_id) {
        Ok(value) => {
            response.headers_mut().insert(header.clone(), value);
        }
        Err(_) => tracing::warn!(correlation_id = %correlation_id, "Correlation id is not a valid header value"),
    }
    response
}
