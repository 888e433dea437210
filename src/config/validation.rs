//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0, addresses parse)
//! - Check consumer references (aliases, built-in names)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::consumer::builtin::BUILTIN_NAMES;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check every semantic rule and collect all violations.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let prefix = &config.api.prefix;
    if !prefix.starts_with('/') {
        errors.push(ValidationError::new("api.prefix", "must start with '/'"));
    } else if prefix.ends_with('/') {
        errors.push(ValidationError::new("api.prefix", "must not end with '/'"));
    }

    if HeaderName::from_bytes(config.api.correlation_header.as_bytes()).is_err() {
        errors.push(ValidationError::new(
            "api.correlation_header",
            format!("'{}' is not a valid header name", config.api.correlation_header),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be greater than 0"));
    }

    let mut aliases: Vec<_> = config.routing.aliases.iter().collect();
    aliases.sort();
    for (from, to) in aliases {
        if from.is_empty() || to.is_empty() {
            errors.push(ValidationError::new(
                "routing.aliases",
                format!("alias '{}' -> '{}' has an empty side", from, to),
            ));
        }
    }

    for name in &config.consumers.builtin {
        if !BUILTIN_NAMES.contains(&name.as_str()) {
            errors.push(ValidationError::new(
                "consumers.builtin",
                format!("unknown built-in consumer '{}'", name),
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
