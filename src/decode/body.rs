//! Raw (non-multipart) body → single payload.

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderMap;
use bytes::Bytes;

use crate::decode::disposition::ContentDisposition;
use crate::decode::DecodeError;
use crate::payload::{MimeType, Payload, PayloadList, PayloadListBuilder, CONTENT_DISPOSITION_ATTRIBUTE};

/// The parts of a `Content-Disposition` header the body decoder keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyDisposition {
    pub disposition_type: String,
    pub filename: Option<String>,
}

/// Parse the first `Content-Disposition` header, if any.
///
/// Must run before the body is read so a malformed header rejects the request
/// before any consumer sees it.
pub fn parse_disposition_header(headers: &HeaderMap) -> Result<Option<BodyDisposition>, DecodeError> {
    let Some(value) = headers.get(CONTENT_DISPOSITION) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| DecodeError::InvalidHeader("Content-Disposition"))?;

    let disposition = ContentDisposition::parse(raw).map_err(|source| DecodeError::Disposition {
        header: raw.to_string(),
        source,
    })?;
    let filename = disposition.filename().map_err(|source| DecodeError::Disposition {
        header: raw.to_string(),
        source,
    })?;

    Ok(Some(BodyDisposition {
        disposition_type: disposition.disposition_type().to_string(),
        filename,
    }))
}

/// The declared body media type; `application/octet-stream` when absent.
pub fn parse_content_type(headers: &HeaderMap) -> Result<MimeType, DecodeError> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Ok(MimeType::application_octet_stream());
    };
    let raw = value
        .to_str()
        .map_err(|_| DecodeError::InvalidHeader("Content-Type"))?;
    raw.parse::<MimeType>().map_err(|source| DecodeError::ContentType {
        header: raw.to_string(),
        source,
    })
}

/// Wrap a fully read body as exactly one byte payload named `name`.
pub fn decode_body(
    name: &str,
    body: Bytes,
    content_type: MimeType,
    disposition: Option<&BodyDisposition>,
) -> Result<PayloadList, DecodeError> {
    tracing::debug!(content_type = %content_type, bytes = body.len(), "Found body parameter");

    let payload = match disposition.and_then(|d| d.filename.as_deref()) {
        Some(filename) => Payload::file(name, body, content_type, filename)?,
        None => Payload::bytes(name, body, content_type)?,
    };
    let payload = match disposition {
        Some(d) => payload.with_attribute(CONTENT_DISPOSITION_ATTRIBUTE, d.disposition_type.as_str()),
        None => payload,
    };

    let mut builder = PayloadListBuilder::default();
    builder.add_payload(payload);
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use crate::payload::BODY_BYTES_PAYLOAD;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(*k, HeaderValue::from_static(*v));
        }
        map
    }

    #[test]
    fn test_body_without_disposition() {
        let h = headers(&[("content-type", "application/xml")]);
        let disposition = parse_disposition_header(&h).unwrap();
        assert!(disposition.is_none());

        let list = decode_body(
            BODY_BYTES_PAYLOAD,
            Bytes::from_static(b"<a/>"),
            parse_content_type(&h).unwrap(),
            disposition.as_ref(),
        )
        .unwrap();
        assert_eq!(list.len(), 1);
        let payload = list.first(BODY_BYTES_PAYLOAD).unwrap();
        assert_eq!(payload.as_bytes(), b"<a/>");
        assert_eq!(payload.content_type().essence(), "application/xml");
        assert_eq!(payload.filename(), None);
        assert!(payload.attributes().is_empty());
    }

    #[test]
    fn test_body_with_filename() {
        let h = headers(&[
            ("content-type", "application/pdf"),
            ("content-disposition", "attachment; filename=\"form.pdf\""),
        ]);
        let disposition = parse_disposition_header(&h).unwrap();
        let list = decode_body(
            BODY_BYTES_PAYLOAD,
            Bytes::from_static(b"%PDF"),
            parse_content_type(&h).unwrap(),
            disposition.as_ref(),
        )
        .unwrap();
        let payload = list.first(BODY_BYTES_PAYLOAD).unwrap();
        assert_eq!(payload.filename(), Some("form.pdf"));
        assert_eq!(payload.attribute(CONTENT_DISPOSITION_ATTRIBUTE), Some("attachment"));
    }

    #[test]
    fn test_malformed_disposition_is_caller_error() {
        let h = headers(&[("content-disposition", "attachment; filename=\"unterminated")]);
        let err = parse_disposition_header(&h).unwrap_err();
        assert!(matches!(err, DecodeError::Disposition { .. }));
        assert!(!err.is_internal());
        assert!(err.to_string().contains("Content-Disposition"));
    }

    #[test]
    fn test_missing_content_type_defaults_to_octet_stream() {
        assert_eq!(
            parse_content_type(&HeaderMap::new()).unwrap(),
            MimeType::application_octet_stream()
        );
        let h = headers(&[("content-type", "nope")]);
        assert!(matches!(parse_content_type(&h), Err(DecodeError::ContentType { .. })));
    }
}
