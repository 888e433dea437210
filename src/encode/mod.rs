//! Outbound encoding subsystem.
//!
//! # Data Flow
//! ```text
//! PayloadList returned by a consumer
//!     → response.rs (choose shape by payload count)
//!         0  → 204 No Content
//!         1  → single body (+ Content-Disposition when a filename exists)
//!         2+ → multipart.rs (one part per payload, original order)
//!     → http layer adds the correlation header
//! ```
//!
//! # Design Decisions
//! - Bodies are assembled in memory, matching the decoders
//! - Only the base name of a filename ever reaches the wire

pub mod multipart;
pub mod response;

use thiserror::Error;

pub use multipart::MultipartWriter;
pub use response::encode_payloads;

/// Errors raised while rendering a payload list.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A computed header value was not a legal HTTP header.
    #[error("invalid response header value '{0}'")]
    InvalidHeader(String),

    /// The response could not be assembled.
    #[error("failed to build response: {0}")]
    Http(#[from] axum::http::Error),
}
