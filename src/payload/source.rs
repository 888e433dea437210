//! The named, typed unit of data exchanged with consumers.

use bytes::Bytes;
use std::collections::HashMap;
use thiserror::Error;

use crate::payload::mime::MimeType;

/// Errors raised when a payload cannot be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// Payload names must be non-empty.
    #[error("payload name must not be empty")]
    EmptyName,

    /// A filename was supplied but was empty.
    #[error("filename for payload '{0}' must not be empty")]
    EmptyFilename(String),
}

/// Payload content: either UTF-8 text or an opaque byte sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Bytes(Bytes),
}

impl Content {
    /// The content as raw bytes (text is UTF-8 encoded).
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Text(text) => text.as_bytes(),
            Content::Bytes(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One named unit of data. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    name: String,
    content: Content,
    content_type: MimeType,
    filename: Option<String>,
    attributes: HashMap<String, String>,
}

impl Payload {
    /// A text payload, typed `text/plain; charset=UTF-8`.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Result<Self, PayloadError> {
        Self::build(name.into(), Content::Text(value.into()), MimeType::text_plain_utf8(), None)
    }

    /// A byte payload with an explicit content type.
    pub fn bytes(
        name: impl Into<String>,
        value: impl Into<Bytes>,
        content_type: MimeType,
    ) -> Result<Self, PayloadError> {
        Self::build(name.into(), Content::Bytes(value.into()), content_type, None)
    }

    /// A byte payload that originated from (or should be rendered as) a file.
    pub fn file(
        name: impl Into<String>,
        value: impl Into<Bytes>,
        content_type: MimeType,
        filename: impl Into<String>,
    ) -> Result<Self, PayloadError> {
        let name = name.into();
        let filename = filename.into();
        if filename.is_empty() {
            return Err(PayloadError::EmptyFilename(name));
        }
        Self::build(name, Content::Bytes(value.into()), content_type, Some(filename))
    }

    fn build(
        name: String,
        content: Content,
        content_type: MimeType,
        filename: Option<String>,
    ) -> Result<Self, PayloadError> {
        if name.is_empty() {
            return Err(PayloadError::EmptyName);
        }
        Ok(Self {
            name,
            content,
            content_type,
            filename,
            attributes: HashMap::new(),
        })
    }

    /// Returns a copy of this payload carrying an extra attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn content_type(&self) -> &MimeType {
        &self.content_type
    }

    /// The filename as supplied, possibly including directories.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Last path component of the filename. Both `/` and `\` count as separators.
    pub fn file_base_name(&self) -> Option<&str> {
        self.filename.as_deref().map(|f| {
            f.rsplit(['/', '\\'])
                .find(|segment| !segment.is_empty())
                .unwrap_or(f)
        })
    }

    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// The text value, if this is a text payload.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) => Some(text),
            Content::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }

    pub fn is_text(&self) -> bool {
        matches!(self.content, Content::Text(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_payload_defaults() {
        let payload = Payload::text("greeting", "hello").unwrap();
        assert_eq!(payload.name(), "greeting");
        assert_eq!(payload.as_text(), Some("hello"));
        assert_eq!(payload.content_type(), &MimeType::text_plain_utf8());
        assert!(payload.filename().is_none());
        assert!(payload.attributes().is_empty());
    }

    #[test]
    fn test_empty_names_rejected() {
        assert_eq!(Payload::text("", "x"), Err(PayloadError::EmptyName));
        assert_eq!(
            Payload::file("doc", vec![1u8], MimeType::application_octet_stream(), ""),
            Err(PayloadError::EmptyFilename("doc".to_string()))
        );
    }

    #[test]
    fn test_file_base_name() {
        let pdf: MimeType = "application/pdf".parse().unwrap();
        let unix = Payload::file("doc", vec![1u8], pdf.clone(), "/tmp/out/report.pdf").unwrap();
        assert_eq!(unix.file_base_name(), Some("report.pdf"));

        let windows = Payload::file("doc", vec![1u8], pdf.clone(), "C:\\Users\\me\\report.pdf").unwrap();
        assert_eq!(windows.file_base_name(), Some("report.pdf"));

        let bare = Payload::file("doc", vec![1u8], pdf, "report.pdf").unwrap();
        assert_eq!(bare.file_base_name(), Some("report.pdf"));
    }

    #[test]
    fn test_attributes() {
        let payload = Payload::bytes("blob", vec![0u8, 1], MimeType::application_octet_stream())
            .unwrap()
            .with_attribute("formsfeeder:Content-Disposition", "attachment");
        assert_eq!(payload.attribute("formsfeeder:Content-Disposition"), Some("attachment"));
        assert_eq!(payload.as_text(), None);
        assert_eq!(payload.as_bytes(), &[0u8, 1]);
    }
}
