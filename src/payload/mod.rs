//! Payload model subsystem.
//!
//! # Data Flow
//! ```text
//! decoders (query / multipart / raw body)
//!     → PayloadListBuilder::add_*
//!     → build() → PayloadList (immutable snapshot)
//!     → PayloadList::concat(...) in the fixed per-shape order
//!     → consumer
//!     → PayloadList returned by the consumer
//!     → encoder
//! ```
//!
//! # Design Decisions
//! - Payloads are immutable; attributes are attached at creation only
//! - Lists are built only through the builder or by concatenation
//! - Content is always fully materialised in memory
//! - Names under the reserved namespace are generated by the gateway itself

pub mod list;
pub mod mime;
pub mod source;

pub use list::{PayloadList, PayloadListBuilder};
pub use mime::{MimeType, MimeTypeError};
pub use source::{Content, Payload, PayloadError};

/// Prefix of every payload name and attribute generated by the gateway.
pub const NAMESPACE_PREFIX: &str = "formsfeeder:";

/// Payload carrying the resolved correlation identifier.
pub const CORRELATION_ID_PAYLOAD: &str = "formsfeeder:CorrelationId";

/// Payload carrying the raw bytes of a non-multipart POST body.
pub const BODY_BYTES_PAYLOAD: &str = "formsfeeder:BodyBytes";

/// Attribute selecting the response disposition type (`inline` or `attachment`).
pub const CONTENT_DISPOSITION_ATTRIBUTE: &str = "formsfeeder:Content-Disposition";

/// True when `name` lies in the gateway's reserved namespace.
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(NAMESPACE_PREFIX)
}
