//! Correlation id handling.
//!
//! # Responsibilities
//! - Resolve the correlation id of a request (caller-supplied or generated)
//! - Feed the same generator into tower-http's request-id middleware
//!
//! # Design Decisions
//! - A supplied id is used verbatim; only a missing or blank one is replaced
//! - UUID v4 for generated ids

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Produces the correlation id for a request.
pub trait CorrelationIdGenerator: Send + Sync + fmt::Debug {
    /// Return `supplied` when it is usable, otherwise a fresh id.
    fn generate(&self, supplied: Option<&str>) -> String;
}

/// Random UUID v4 ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl CorrelationIdGenerator for UuidGenerator {
    fn generate(&self, supplied: Option<&str>) -> String {
        match supplied.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        }
    }
}

/// Adapter plugging a [`CorrelationIdGenerator`] into `SetRequestIdLayer`.
#[derive(Debug, Clone)]
pub struct MakeCorrelationId {
    generator: Arc<dyn CorrelationIdGenerator>,
}

impl MakeCorrelationId {
    pub fn new(generator: Arc<dyn CorrelationIdGenerator>) -> Self {
        Self { generator }
    }
}

impl MakeRequestId for MakeCorrelationId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&self.generator.generate(None))
            .ok()
            .map(RequestId::new)
    }
}
