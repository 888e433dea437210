//! Consumer resolution, invocation and failure classification.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::consumer::{ConsumerError, ConsumerRegistry, FailureKind, RetryHint};
use crate::observability::metrics;
use crate::payload::PayloadList;
use crate::routing::{IdentityResolver, NameResolver};

/// What the dispatcher reports for a failed invocation.
///
/// Carries only the consumer's own message; causes stay in the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchFailure {
    pub kind: FailureKind,
    pub message: String,
    pub retry: RetryHint,
}

impl DispatchFailure {
    fn not_found(requested: &str) -> Self {
        Self {
            kind: FailureKind::NotFound,
            message: format!("no consumer registered for '{}'", requested),
            retry: RetryHint::Fail,
        }
    }

    fn panicked() -> Self {
        Self {
            kind: FailureKind::Unclassified,
            message: "unexpected consumer failure".to_string(),
            retry: RetryHint::Fail,
        }
    }
}

impl From<&ConsumerError> for DispatchFailure {
    fn from(err: &ConsumerError) -> Self {
        Self {
            kind: err.kind(),
            message: err.message().to_string(),
            retry: err.retry(),
        }
    }
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, retry={})", self.message, self.kind, self.retry)
    }
}

/// Resolves a consumer by name and invokes it.
///
/// Holds only read-only state, so one instance serves all requests.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<dyn ConsumerRegistry>,
    resolver: Arc<dyn NameResolver>,
}

impl Dispatcher {
    /// Dispatcher using the identity name mapping.
    pub fn new(registry: Arc<dyn ConsumerRegistry>) -> Self {
        Self {
            registry,
            resolver: Arc::new(IdentityResolver),
        }
    }

    /// Swap in a different name resolution strategy.
    pub fn with_resolver(mut self, resolver: Arc<dyn NameResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Metrics label for `requested`: the resolved name of a registered
    /// consumer, [`metrics::UNKNOWN_CONSUMER`] otherwise.
    pub fn metric_label(&self, requested: &str) -> String {
        let name = self.resolver.resolve(requested);
        if self.registry.lookup(&name).is_some() {
            name
        } else {
            metrics::UNKNOWN_CONSUMER.to_string()
        }
    }

    /// Invoke the consumer registered for `requested` with `inputs`.
    ///
    /// Runs the consumer synchronously on the calling thread. Never retries.
    pub fn dispatch(&self, requested: &str, inputs: PayloadList) -> Result<PayloadList, DispatchFailure> {
        let name = self.resolver.resolve(requested);
        let Some(consumer) = self.registry.lookup(&name) else {
            tracing::error!(requested = %requested, consumer = %name, "No consumer registered");
            metrics::record_consumer_failure(FailureKind::NotFound, RetryHint::Fail);
            return Err(DispatchFailure::not_found(requested));
        };

        tracing::debug!(consumer = %name, inputs = inputs.len(), "Before calling consumer");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| consumer.accept(inputs)));
        tracing::debug!(consumer = %name, "After calling consumer");

        match outcome {
            Ok(Ok(outputs)) => Ok(outputs),
            Ok(Err(err)) => {
                tracing::error!(
                    consumer = %name,
                    kind = %err.kind(),
                    retry = %err.retry(),
                    error = %err,
                    causes = %cause_chain(&err),
                    "Consumer failed"
                );
                metrics::record_consumer_failure(err.kind(), err.retry());
                Err(DispatchFailure::from(&err))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(consumer = %name, panic = %message, "Consumer panicked");
                metrics::record_consumer_failure(FailureKind::Unclassified, RetryHint::Fail);
                Err(DispatchFailure::panicked())
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

fn cause_chain(err: &dyn StdError) -> String {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        causes.push(cause.to_string());
        current = cause.source();
    }
    if causes.is_empty() {
        "none".to_string()
    } else {
        causes.join(": ")
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected failure".to_string()
    }
}
