//! Consumers shipped with the gateway binary.

use crate::consumer::{Consumer, ConsumerError, StaticRegistry};
use crate::payload::{PayloadList, PayloadListBuilder, CORRELATION_ID_PAYLOAD};

/// Names accepted by `consumers.builtin` in the configuration.
pub const BUILTIN_NAMES: &[&str] = &[Echo::NAME];

/// Returns the caller's payloads, dropping the correlation id metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct Echo;

impl Echo {
    pub const NAME: &'static str = "echo";
}

impl Consumer for Echo {
    fn accept(&self, inputs: PayloadList) -> Result<PayloadList, ConsumerError> {
        let mut builder = PayloadListBuilder::default();
        for payload in inputs.iter().filter(|p| p.name() != CORRELATION_ID_PAYLOAD) {
            builder.add_payload(payload.clone());
        }
        Ok(builder.build())
    }
}

/// Register the named built-in consumers. Unknown names are skipped with a warning;
/// configuration validation rejects them earlier.
pub fn register_builtins(mut registry: StaticRegistry, names: &[String]) -> StaticRegistry {
    for name in names {
        match name.as_str() {
            Echo::NAME => registry = registry.register(Echo::NAME, Echo),
            other => tracing::warn!(consumer = %other, "Unknown built-in consumer"),
        }
    }
    registry
}
