//! Consumer contract.
//!
//! # Data Flow
//! ```text
//! PayloadList (inputs)
//!     → Consumer::accept
//!     → Ok(PayloadList)            → encoder
//!     → Err(ConsumerError{kind,…}) → dispatcher classification → status
//! ```
//!
//! # Design Decisions
//! - One failure value tagged with a kind instead of an error hierarchy
//! - Every failure carries a retry hint; the gateway never retries itself
//! - Any `Fn(PayloadList) -> Result<PayloadList, ConsumerError>` is a consumer

pub mod builtin;
pub mod registry;

use std::fmt;
use thiserror::Error;

use crate::payload::PayloadList;

pub use registry::{ConsumerRegistry, StaticRegistry};

/// A named, pluggable processor of payload lists.
pub trait Consumer: Send + Sync {
    /// Process the inputs and return the outputs, or a classified failure.
    fn accept(&self, inputs: PayloadList) -> Result<PayloadList, ConsumerError>;
}

impl<F> Consumer for F
where
    F: Fn(PayloadList) -> Result<PayloadList, ConsumerError> + Send + Sync,
{
    fn accept(&self, inputs: PayloadList) -> Result<PayloadList, ConsumerError> {
        self(inputs)
    }
}

/// Classification of a failed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The input was invalid; the caller can fix it.
    CallerFixable,
    /// Environment or backend fault unrelated to the input.
    Internal,
    /// Anything else, including faults the consumer did not anticipate.
    Unclassified,
    /// No consumer is registered under the requested name.
    NotFound,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::CallerFixable => "caller_fixable",
            FailureKind::Internal => "internal",
            FailureKind::Unclassified => "unclassified",
            FailureKind::NotFound => "not_found",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether resubmitting the identical request might succeed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RetryHint {
    /// Resubmitting will not help.
    #[default]
    Fail,
    /// Resubmission may succeed (e.g. a transient backend issue).
    Retry,
}

impl RetryHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryHint::Fail => "FAIL",
            RetryHint::Retry => "RETRY",
        }
    }
}

impl fmt::Display for RetryHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The failure a consumer reports.
///
/// `message` is the only part that may reach the caller; `source` is for logs.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConsumerError {
    kind: FailureKind,
    message: String,
    retry: RetryHint,
    #[source]
    source: Option<BoxError>,
}

impl ConsumerError {
    /// A failure of the given kind. The retry hint defaults to [`RetryHint::Fail`].
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry: RetryHint::default(),
            source: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryHint) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn retry(&self) -> RetryHint {
        self.retry
    }
}
