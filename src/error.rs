//! Request-level failures and their wire rendering.

use axum::http::StatusCode;
use thiserror::Error;

use crate::consumer::{FailureKind, RetryHint};
use crate::decode::DecodeError;
use crate::dispatch::DispatchFailure;
use crate::encode::EncodeError;

/// Anything that stops a request from producing a consumer's output.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Dispatch(DispatchFailure),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl From<DispatchFailure> for GatewayError {
    fn from(failure: DispatchFailure) -> Self {
        GatewayError::Dispatch(failure)
    }
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Decode(DecodeError::TooLarge) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Decode(e) if e.is_internal() => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Decode(_) => StatusCode::BAD_REQUEST,
            GatewayError::Dispatch(failure) => match failure.kind {
                FailureKind::NotFound => StatusCode::NOT_FOUND,
                FailureKind::CallerFixable => StatusCode::BAD_REQUEST,
                FailureKind::Internal | FailureKind::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
            },
            GatewayError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Retry hint to expose, present only for failures raised by a consumer.
    pub fn retry(&self) -> Option<RetryHint> {
        match self {
            GatewayError::Dispatch(failure) if failure.kind != FailureKind::NotFound => Some(failure.retry),
            _ => None,
        }
    }

    /// Terse text sent to the caller. `resource` is the requested path.
    pub fn client_message(&self, resource: &str) -> String {
        match self {
            GatewayError::Decode(e) if e.is_internal() => "Error while reading request.".to_string(),
            GatewayError::Decode(e) => e.to_string(),
            GatewayError::Dispatch(failure) => match failure.kind {
                FailureKind::NotFound => format!("Resource '{}' does not exist.", resource),
                FailureKind::CallerFixable => format!("Consumer detected Bad Request. ({})", failure.message),
                FailureKind::Internal => {
                    format!("Consumer experienced an Internal Server Error. ({})", failure.message)
                }
                FailureKind::Unclassified => format!("Consumer processing error. ({})", failure.message),
            },
            GatewayError::Encode(_) => "Error while building response.".to_string(),
        }
    }
}
