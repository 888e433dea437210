//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming path  /<api-prefix>/<remainder>
//!     → axum route captures <remainder>
//!     → resolver.rs (remainder → consumer name)
//!     → Dispatcher registry lookup
//! ```
//!
//! # Design Decisions
//! - Resolver chosen at startup, immutable at runtime
//! - Identity mapping unless aliases are configured
//! - Deterministic: same remainder always resolves to the same name

pub mod resolver;

pub use resolver::{AliasResolver, IdentityResolver, NameResolver};
