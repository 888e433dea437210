//! `multipart/form-data` → payload list.
//!
//! # Responsibilities
//! - Walk the parts of a multipart body in wire order
//! - Classify each part as simple (text) or complex (bytes)
//! - Read every part fully into memory
//!
//! # Design Decisions
//! - Requests: simple means no declared Content-Type, or a `text/plain` one;
//!   a simple part never carries a filename even when its disposition names one
//! - Responses: only an unnamed-file `text/plain; charset=UTF-8` (or untyped)
//!   part is text; everything else keeps its declared type and filename
//! - Text is decoded with the part's declared charset; content that does not
//!   decode stays as bytes with the declared type, never replacement characters
//! - A malformed individual part degrades (octet-stream, multer's filename)
//!   instead of failing the whole request
//! - Only a failing body stream is an I/O error; envelope errors are the caller's

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderMap;
use bytes::Bytes;
use encoding_rs::Encoding;
use futures_util::Stream;

use crate::decode::disposition::ContentDisposition;
use crate::decode::{BoxError, DecodeError};
use crate::payload::{MimeType, PayloadList, PayloadListBuilder};

/// How a multipart part is turned into a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text field: becomes a text payload, filename ignored.
    Simple,
    /// Binary or file field: becomes a byte payload.
    Complex,
}

/// Which side of the wire a multipart body is decoded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartPolicy {
    /// Inbound request form: any `text/plain` part is a text field.
    Request,
    /// Gateway response: parts keep the type and filename the encoder wrote.
    Response,
}

impl PartPolicy {
    fn classify(self, content_type: Option<&str>, has_filename: bool) -> FieldKind {
        match self {
            PartPolicy::Request => classify(content_type),
            PartPolicy::Response if has_filename => FieldKind::Complex,
            PartPolicy::Response => match content_type.map(str::parse::<MimeType>) {
                None => FieldKind::Simple,
                Some(Ok(mime)) if is_utf8_text(&mime) => FieldKind::Simple,
                Some(_) => FieldKind::Complex,
            },
        }
    }
}

fn is_utf8_text(mime: &MimeType) -> bool {
    mime.is_text_plain() && mime.charset().is_some_and(|c| c.eq_ignore_ascii_case("UTF-8"))
}

/// Classify a request part by its declared Content-Type header.
pub fn classify(content_type: Option<&str>) -> FieldKind {
    match content_type.map(str::parse::<MimeType>) {
        None => FieldKind::Simple,
        Some(Ok(mime)) if mime.is_text_plain() => FieldKind::Simple,
        Some(_) => FieldKind::Complex,
    }
}

/// Decode `bytes` as text in `charset` (UTF-8 when absent).
///
/// `None` when the charset is unknown or the bytes are not valid in it.
pub fn decode_text(bytes: &[u8], charset: Option<&str>) -> Option<String> {
    let encoding = match charset {
        Some(label) => Encoding::for_label(label.trim().as_bytes())?,
        None => encoding_rs::UTF_8,
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

/// Extract the boundary from a `multipart/form-data` Content-Type value.
pub fn boundary(content_type: &str) -> Result<String, DecodeError> {
    multer::parse_boundary(content_type).map_err(|e| DecodeError::Multipart(e.to_string()))
}

/// Decode a multipart body stream into a payload list, one payload per part.
pub async fn decode_multipart<S, O, E>(
    stream: S,
    boundary: String,
    policy: PartPolicy,
) -> Result<PayloadList, DecodeError>
where
    S: Stream<Item = Result<O, E>> + Send + 'static,
    O: Into<Bytes> + 'static,
    E: Into<BoxError> + 'static,
{
    let mut multipart = multer::Multipart::new(stream, boundary);
    let mut builder = PayloadListBuilder::default();

    while let Some(field) = multipart.next_field().await.map_err(map_multer_error)? {
        let name = field
            .name()
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .ok_or_else(|| DecodeError::Multipart("part without a field name".to_string()))?;
        let headers = field.headers().clone();
        let declared_type = header_str(&headers, CONTENT_TYPE.as_str());
        let filename = part_filename(&headers, field.file_name());

        let parsed_type = declared_type
            .as_deref()
            .and_then(|ct| match ct.parse::<MimeType>() {
                Ok(mime) => Some(mime),
                Err(e) => {
                    tracing::warn!(field = %name, content_type = %ct, error = %e, "Unparseable part content type, using application/octet-stream");
                    None
                }
            });

        match policy.classify(declared_type.as_deref(), filename.is_some()) {
            FieldKind::Simple => {
                tracing::debug!(field = %name, "Found simple form data part");
                if let Some(ignored) = &filename {
                    tracing::debug!(field = %name, filename = %ignored, "Ignoring filename on simple part");
                }
                let bytes = field.bytes().await.map_err(map_multer_error)?;
                let charset = parsed_type.as_ref().and_then(MimeType::charset);
                match decode_text(&bytes, charset) {
                    Some(text) => {
                        builder.add_text(name, text)?;
                    }
                    None => {
                        let content_type = parsed_type.unwrap_or_else(MimeType::application_octet_stream);
                        tracing::warn!(field = %name, content_type = %content_type, "Text part does not decode in its charset, keeping bytes");
                        builder.add_bytes(name, bytes, content_type)?;
                    }
                }
            }
            FieldKind::Complex => {
                let content_type = parsed_type.unwrap_or_else(MimeType::application_octet_stream);
                tracing::debug!(field = %name, content_type = %content_type, filename = ?filename, "Found complex form data part");
                let bytes = field.bytes().await.map_err(map_multer_error)?;
                match filename {
                    Some(filename) => builder.add_file(name, bytes, content_type, filename)?,
                    None => builder.add_bytes(name, bytes, content_type)?,
                };
            }
        }
    }

    Ok(builder.build())
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Filename from the part's disposition, falling back to multer's lenient parse.
fn part_filename(headers: &HeaderMap, lenient: Option<&str>) -> Option<String> {
    header_str(headers, CONTENT_DISPOSITION.as_str())
        .and_then(|raw| ContentDisposition::parse(&raw).ok())
        .and_then(|cd| cd.filename().ok().flatten())
        .or_else(|| lenient.filter(|f| !f.is_empty()).map(str::to_string))
}

fn map_multer_error(err: multer::Error) -> DecodeError {
    match err {
        multer::Error::StreamReadFailed(source) => DecodeError::body_read(source),
        other => DecodeError::Multipart(other.to_string()),
    }
}
