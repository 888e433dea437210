//! Payload list → HTTP response, shaped by payload count.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};

use crate::decode::disposition::ContentDisposition;
use crate::encode::multipart::MultipartWriter;
use crate::encode::EncodeError;
use crate::payload::{Content, Payload, PayloadList, CONTENT_DISPOSITION_ATTRIBUTE};

/// Render a consumer's output.
///
/// - no payloads → `204 No Content`, empty body
/// - one payload → its content as the body, its content type, and a
///   disposition header when it has a filename
/// - two or more → `multipart/form-data`, one part per payload, in order
pub fn encode_payloads(outputs: &PayloadList) -> Result<Response, EncodeError> {
    match outputs.as_slice() {
        [] => {
            tracing::debug!("Returning no payloads");
            Response::builder()
                .status(StatusCode::NO_CONTENT)
                .body(Body::empty())
                .map_err(EncodeError::from)
        }
        [single] => encode_single(single),
        many => {
            let mut writer = MultipartWriter::new();
            for payload in many {
                match payload.file_base_name() {
                    Some(filename) => writer.file(payload.name(), filename, payload.content_type(), payload.as_bytes()),
                    None => writer.field(payload.name(), payload.content_type(), payload.as_bytes()),
                };
                tracing::debug!(
                    name = %payload.name(),
                    content_type = %payload.content_type(),
                    filename = ?payload.file_base_name(),
                    "Added response part"
                );
            }
            let content_type = header_value(writer.content_type())?;
            tracing::debug!(parts = writer.part_count(), content_type = ?content_type, "Returning multiple payloads");
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(writer.finish()))
                .map_err(EncodeError::from)
        }
    }
}

fn encode_single(payload: &Payload) -> Result<Response, EncodeError> {
    let content_type = header_value(payload.content_type().to_string())?;
    tracing::debug!(content_type = ?content_type, "Returning one payload");

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type);

    if let Some(filename) = payload.file_base_name() {
        let disposition_type = payload
            .attribute(CONTENT_DISPOSITION_ATTRIBUTE)
            .unwrap_or(ContentDisposition::INLINE);
        let disposition = ContentDisposition::new(disposition_type).with_param("filename", filename);
        builder = builder.header(header::CONTENT_DISPOSITION, header_value(disposition.to_string())?);
    }

    let body = match payload.content() {
        Content::Text(text) => Body::from(text.clone()),
        Content::Bytes(bytes) => Body::from(bytes.clone()),
    };
    builder.body(body).map_err(EncodeError::from)
}

fn header_value(value: String) -> Result<HeaderValue, EncodeError> {
    HeaderValue::try_from(value.as_str()).map_err(|_| EncodeError::InvalidHeader(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::MimeType;

    async fn body_bytes(response: Response) -> bytes::Bytes {
        axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap()
    }

    #[tokio::test]
    async fn test_zero_payloads_is_no_content() {
        let response = encode_payloads(&PayloadList::empty()).unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_single_text_payload() {
        let mut builder = PayloadList::builder();
        builder.add_text("message", "hi there").unwrap();
        let response = encode_payloads(&builder.build()).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain; charset=UTF-8");
        assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
        assert_eq!(&body_bytes(response).await[..], b"hi there");
    }

    #[tokio::test]
    async fn test_single_file_defaults_to_inline_base_name() {
        let mut builder = PayloadList::builder();
        builder
            .add_file("doc", vec![1u8, 2, 3], "application/pdf".parse().unwrap(), "out/dir/result.pdf")
            .unwrap();
        let response = encode_payloads(&builder.build()).unwrap();

        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "inline; filename=\"result.pdf\""
        );
    }

    #[tokio::test]
    async fn test_single_file_attachment_attribute() {
        let payload = Payload::file("doc", vec![1u8], MimeType::application_octet_stream(), "a.bin")
            .unwrap()
            .with_attribute(CONTENT_DISPOSITION_ATTRIBUTE, "attachment");
        let mut builder = PayloadList::builder();
        builder.add_payload(payload);
        let response = encode_payloads(&builder.build()).unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"a.bin\""
        );
    }

    #[tokio::test]
    async fn test_many_payloads_become_multipart() {
        let mut builder = PayloadList::builder();
        builder.add_text("first", "1").unwrap();
        builder
            .add_file("second", vec![7u8], MimeType::application_octet_stream(), "/tmp/seven.bin")
            .unwrap();
        let response = encode_payloads(&builder.build()).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert!(content_type.starts_with("multipart/form-data; boundary="));

        let body = String::from_utf8_lossy(&body_bytes(response).await).into_owned();
        let first = body.find("name=\"first\"").unwrap();
        let second = body.find("name=\"second\"; filename=\"seven.bin\"").unwrap();
        assert!(first < second);
        assert!(!body.contains("/tmp/"));
    }
}
