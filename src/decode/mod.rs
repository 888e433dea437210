//! Inbound decoding subsystem.
//!
//! # Data Flow
//! ```text
//! GET  (query only)        → query.rs                       ┐
//! POST multipart/form-data → multipart.rs, then query.rs    ├→ PayloadList::concat(.., metadata)
//! POST anything else       → body.rs,      then query.rs    ┘
//!
//! Client side:
//! gateway response         → response.rs (reuses multipart.rs / body.rs)
//! ```
//!
//! # Design Decisions
//! - Every decoder materialises its input fully before producing payloads
//! - Disposition headers are parsed before the body is read
//! - Stream failures are internal errors; everything else is the caller's to fix

pub mod body;
pub mod disposition;
pub mod multipart;
pub mod query;
pub mod response;

use http_body_util::LengthLimitError;
use thiserror::Error;

use crate::payload::{MimeTypeError, PayloadError};

pub use disposition::{ContentDisposition, DispositionError};

/// Boxed error carried by I/O failures from the body stream.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while turning a request (or response) into payloads.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Content-Disposition header could not be parsed.
    #[error("Error while parsing Content-Disposition header ({source}). 'Content-Disposition: {header}'")]
    Disposition {
        header: String,
        #[source]
        source: DispositionError,
    },

    /// Content-Type header could not be parsed.
    #[error("Invalid Content-Type header ({source}). 'Content-Type: {header}'")]
    ContentType {
        header: String,
        #[source]
        source: MimeTypeError,
    },

    /// A header was present but not visible ASCII.
    #[error("{0} header is not valid visible ASCII")]
    InvalidHeader(&'static str),

    /// The multipart envelope was malformed.
    #[error("Malformed multipart/form-data body ({0})")]
    Multipart(String),

    /// Decoded input could not form a payload (e.g. an empty name).
    #[error("Invalid input ({0})")]
    Payload(#[from] PayloadError),

    /// The body was larger than the configured limit.
    #[error("Request body exceeds the configured size limit")]
    TooLarge,

    /// Reading the body failed underneath the decoder.
    #[error("I/O failure while reading the body ({0})")]
    Io(#[source] BoxError),
}

impl DecodeError {
    /// True when the failure is the gateway's, not the caller's.
    pub fn is_internal(&self) -> bool {
        matches!(self, DecodeError::Io(_))
    }

    /// Classify a failure raised by the body stream.
    pub fn body_read(err: BoxError) -> Self {
        let root: &(dyn std::error::Error + 'static) = err.as_ref();
        let mut current = Some(root);
        while let Some(e) = current {
            if e.is::<LengthLimitError>() {
                return DecodeError::TooLarge;
            }
            current = e.source();
        }
        DecodeError::Io(err)
    }
}
