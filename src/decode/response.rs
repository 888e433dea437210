//! Gateway response → payload list (client side of the wire contract).

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use std::convert::Infallible;

use crate::decode::body::{decode_body, parse_content_type, parse_disposition_header};
use crate::decode::multipart::{boundary, decode_multipart, PartPolicy};
use crate::decode::DecodeError;
use crate::payload::PayloadList;

/// Decode a fully read gateway response.
///
/// - `204 No Content` (or an untyped empty body) → empty list
/// - `multipart/form-data` → one payload per part, types and filenames as sent
/// - anything else → one byte payload named `body_name`
pub async fn decode_response(
    status: StatusCode,
    headers: &HeaderMap,
    body: Bytes,
    body_name: &str,
) -> Result<PayloadList, DecodeError> {
    if status == StatusCode::NO_CONTENT || (body.is_empty() && !headers.contains_key(CONTENT_TYPE)) {
        return Ok(PayloadList::empty());
    }

    let content_type = parse_content_type(headers)?;
    if content_type.is_multipart_form_data() {
        let raw = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .ok_or(DecodeError::InvalidHeader("Content-Type"))?;
        let boundary = boundary(raw)?;
        let stream = futures_util::stream::once(async move { Ok::<_, Infallible>(body) });
        return decode_multipart(stream, boundary, PartPolicy::Response).await;
    }

    let disposition = parse_disposition_header(headers)?;
    decode_body(body_name, body, content_type, disposition.as_ref())
}
