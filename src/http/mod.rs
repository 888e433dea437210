//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → correlation.rs (resolve or generate the correlation id)
//!     → handlers.rs (decode, dispatch, encode)
//!     → response.rs (failure rendering, correlation header)
//!     → Send to client
//! ```

pub mod correlation;
pub mod handlers;
pub mod response;
pub mod server;

pub use correlation::{CorrelationIdGenerator, MakeCorrelationId, UuidGenerator};
pub use response::RETRY_HEADER;
pub use server::{AppState, GatewayServer};
