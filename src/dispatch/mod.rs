//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Decoded PayloadList + requested name
//!     → routing::NameResolver (requested → consumer name)
//!     → ConsumerRegistry lookup (miss → NotFound)
//!     → Consumer::accept on the calling thread
//!     → Ok(PayloadList) | DispatchFailure { kind, message, retry }
//! ```
//!
//! # Design Decisions
//! - One dispatcher shared by every request, no mutable state
//! - Consumer panics are captured and reported as unclassified failures
//! - Failures are logged here with their cause chain; callers only see the message

pub mod dispatcher;

pub use dispatcher::{DispatchFailure, Dispatcher};
