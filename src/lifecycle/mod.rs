//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscriber wakes → server stops accepting,
//!     in-flight requests finish → exit
//! ```
//!
//! # Design Decisions
//! - One broadcast channel fans the shutdown out to every task
//! - Tests drive shutdown directly, without OS signals

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::{shutdown_signal, spawn_signal_handler};
