//! Metrics collection and exposition.
//!
//! # Metrics
//! - `feed_gateway_requests_total` (counter): requests by consumer, status
//! - `feed_gateway_request_duration_seconds` (histogram): latency by consumer
//! - `feed_gateway_consumer_failures_total` (counter): consumer failures by kind, retry hint
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   exporter every call is a no-op
//! - Consumer label is the resolved name of a registered consumer; anything
//!   else shares [`UNKNOWN_CONSUMER`] so caller paths cannot grow the series set

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::consumer::{FailureKind, RetryHint};

pub const REQUESTS_TOTAL: &str = "feed_gateway_requests_total";
pub const REQUEST_DURATION: &str = "feed_gateway_request_duration_seconds";
pub const CONSUMER_FAILURES_TOTAL: &str = "feed_gateway_consumer_failures_total";

/// Consumer label for requests that name no registered consumer.
pub const UNKNOWN_CONSUMER: &str = "unknown";

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one finished request.
pub fn record_request(consumer: &str, status: u16, start: Instant) {
    let consumer = consumer.to_string();
    metrics::counter!(REQUESTS_TOTAL, "consumer" => consumer.clone(), "status" => status.to_string()).increment(1);
    metrics::histogram!(REQUEST_DURATION, "consumer" => consumer).record(start.elapsed().as_secs_f64());
}

/// Record one consumer failure, including lookups that found nothing.
pub fn record_consumer_failure(kind: FailureKind, retry: RetryHint) {
    metrics::counter!(CONSUMER_FAILURES_TOTAL, "kind" => kind.as_str(), "retry" => retry.as_str()).increment(1);
}
