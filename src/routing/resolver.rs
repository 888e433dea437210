//! Path remainder → consumer name resolution.
//!
//! # Responsibilities
//! - Map the part of the path after the API prefix to a consumer name
//! - Allow an indirection layer without touching the dispatcher
//!
//! # Design Decisions
//! - Resolution is a pure function: same remainder, same name
//! - Matching is exact and case-sensitive
//! - Unmapped names fall through unchanged

use std::collections::HashMap;

/// Strategy turning a path remainder into a consumer name.
pub trait NameResolver: Send + Sync + std::fmt::Debug {
    fn resolve(&self, remainder: &str) -> String;
}

/// The remainder is the consumer name.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl NameResolver for IdentityResolver {
    fn resolve(&self, remainder: &str) -> String {
        remainder.to_string()
    }
}

/// Configured aliases; anything not aliased resolves to itself.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    aliases: HashMap<String, String>,
}

impl AliasResolver {
    pub fn new(aliases: HashMap<String, String>) -> Self {
        Self { aliases }
    }
}

impl NameResolver for AliasResolver {
    fn resolve(&self, remainder: &str) -> String {
        self.aliases
            .get(remainder)
            .cloned()
            .unwrap_or_else(|| remainder.to_string())
    }
}
