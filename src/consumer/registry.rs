//! Consumer lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::consumer::Consumer;

/// Read-only lookup of consumers by name.
pub trait ConsumerRegistry: Send + Sync {
    fn lookup(&self, name: &str) -> Option<Arc<dyn Consumer>>;
}

/// A registry populated once at startup and never modified afterwards.
#[derive(Clone, Default)]
pub struct StaticRegistry {
    consumers: HashMap<String, Arc<dyn Consumer>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer, replacing any previous one with the same name.
    pub fn register(mut self, name: impl Into<String>, consumer: impl Consumer + 'static) -> Self {
        let name = name.into();
        if self.consumers.insert(name.clone(), Arc::new(consumer)).is_some() {
            tracing::warn!(consumer = %name, "Replacing previously registered consumer");
        }
        self
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.consumers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.consumers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumers.is_empty()
    }
}

impl ConsumerRegistry for StaticRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<dyn Consumer>> {
        self.consumers.get(name).cloned()
    }
}

impl fmt::Debug for StaticRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticRegistry")
            .field("consumers", &self.names())
            .finish()
    }
}
