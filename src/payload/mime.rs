//! MIME type representation carried by every payload.
//!
//! Only `type/subtype` and the `charset` parameter are retained; every other
//! media-type parameter is dropped on parse.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a media type string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MimeTypeError {
    /// Input was empty or whitespace.
    #[error("empty media type")]
    Empty,

    /// No `/` separating type and subtype.
    #[error("media type '{0}' is missing a subtype")]
    MissingSubtype(String),

    /// Type or subtype contained characters outside the HTTP token set.
    #[error("media type '{0}' contains invalid characters")]
    InvalidToken(String),
}

/// A media type: `type/subtype` with an optional charset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MimeType {
    type_: String,
    subtype: String,
    charset: Option<String>,
}

impl MimeType {
    /// `text/plain; charset=UTF-8`, the content type of every text payload.
    pub fn text_plain_utf8() -> Self {
        Self {
            type_: "text".to_string(),
            subtype: "plain".to_string(),
            charset: Some("UTF-8".to_string()),
        }
    }

    /// `application/octet-stream`, used when a body declares nothing usable.
    pub fn application_octet_stream() -> Self {
        Self {
            type_: "application".to_string(),
            subtype: "octet-stream".to_string(),
            charset: None,
        }
    }

    /// Build a media type from its parts.
    pub fn new(type_: &str, subtype: &str, charset: Option<&str>) -> Result<Self, MimeTypeError> {
        let type_ = type_.trim();
        let subtype = subtype.trim();
        if type_.is_empty() && subtype.is_empty() {
            return Err(MimeTypeError::Empty);
        }
        if subtype.is_empty() {
            return Err(MimeTypeError::MissingSubtype(type_.to_string()));
        }
        if !is_token(type_) || !is_token(subtype) {
            return Err(MimeTypeError::InvalidToken(format!("{}/{}", type_, subtype)));
        }
        let charset = charset
            .map(|c| c.trim().trim_matches('"'))
            .filter(|c| !c.is_empty());
        if let Some(c) = charset {
            if !is_token(c) {
                return Err(MimeTypeError::InvalidToken(c.to_string()));
            }
        }
        Ok(Self {
            type_: type_.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            charset: charset.map(str::to_string),
        })
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// `type/subtype` without parameters.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.type_, self.subtype)
    }

    /// True for `text/plain`, whatever the charset.
    pub fn is_text_plain(&self) -> bool {
        self.type_ == "text" && self.subtype == "plain"
    }

    /// True for `multipart/form-data`.
    pub fn is_multipart_form_data(&self) -> bool {
        self.type_ == "multipart" && self.subtype == "form-data"
    }
}

impl FromStr for MimeType {
    type Err = MimeTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split(';');
        let essence = segments.next().unwrap_or_default().trim();
        if essence.is_empty() {
            return Err(MimeTypeError::Empty);
        }
        let (type_, subtype) = essence
            .split_once('/')
            .ok_or_else(|| MimeTypeError::MissingSubtype(essence.to_string()))?;

        let charset = segments
            .filter_map(|param| param.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value);

        Self::new(type_, subtype, charset)
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.charset {
            Some(charset) => write!(f, "{}/{}; charset={}", self.type_, self.subtype, charset),
            None => write!(f, "{}/{}", self.type_, self.subtype),
        }
    }
}

/// RFC 7230 token characters.
pub(crate) fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~'
                )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_charset() {
        let mime: MimeType = "Text/HTML; charset=\"utf-8\"".parse().unwrap();
        assert_eq!(mime.type_(), "text");
        assert_eq!(mime.subtype(), "html");
        assert_eq!(mime.charset(), Some("utf-8"));
        assert_eq!(mime.to_string(), "text/html; charset=utf-8");
    }

    #[test]
    fn test_parse_drops_other_parameters() {
        let mime: MimeType = "multipart/form-data; boundary=abc".parse().unwrap();
        assert!(mime.is_multipart_form_data());
        assert_eq!(mime.charset(), None);
        assert_eq!(mime.to_string(), "multipart/form-data");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<MimeType>(), Err(MimeTypeError::Empty));
        assert!(matches!("text".parse::<MimeType>(), Err(MimeTypeError::MissingSubtype(_))));
        assert!(matches!("text/".parse::<MimeType>(), Err(MimeTypeError::MissingSubtype(_))));
        assert!(matches!("te xt/plain".parse::<MimeType>(), Err(MimeTypeError::InvalidToken(_))));
    }

    #[test]
    fn test_text_plain_detection() {
        assert!(MimeType::text_plain_utf8().is_text_plain());
        assert!(!MimeType::application_octet_stream().is_text_plain());
        assert_eq!(MimeType::text_plain_utf8().essence(), "text/plain");
    }
}
