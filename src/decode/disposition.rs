//! `Content-Disposition` parsing and rendering.
//!
//! # Responsibilities
//! - Parse `type; key=token; key="quoted"; filename*=UTF-8''pct%20encoded`
//! - Render disposition headers for single-body responses and multipart parts
//!
//! # Design Decisions
//! - Parameter keys are case-insensitive; the first occurrence wins
//! - `filename*` (RFC 5987) takes precedence over `filename`
//! - Rendering always produces visible ASCII so the result is a valid header

use std::fmt;
use thiserror::Error;

use crate::payload::mime::is_token;

/// Errors raised by [`ContentDisposition::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispositionError {
    #[error("missing disposition type")]
    MissingType,

    #[error("invalid disposition type '{0}'")]
    InvalidType(String),

    #[error("invalid parameter at offset {0}")]
    InvalidParameter(usize),

    #[error("parameter '{0}' has no value")]
    MissingValue(String),

    #[error("unterminated quoted string in parameter '{0}'")]
    UnterminatedQuote(String),

    #[error("unexpected character '{found}' at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },

    #[error("invalid extended value for parameter '{0}'")]
    InvalidExtendedValue(String),
}

/// A parsed or to-be-rendered `Content-Disposition` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    disposition_type: String,
    params: Vec<(String, String)>,
}

impl ContentDisposition {
    /// `inline`, the default disposition type of single-body responses.
    pub const INLINE: &'static str = "inline";

    /// `form-data`, used for every multipart part.
    pub const FORM_DATA: &'static str = "form-data";

    pub fn new(disposition_type: impl Into<String>) -> Self {
        Self {
            disposition_type: disposition_type.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Parse a header value.
    pub fn parse(header: &str) -> Result<Self, DispositionError> {
        let mut cursor = Cursor::new(header);
        cursor.skip_whitespace();

        let disposition_type = cursor.take_while(|c| c != ';' && !c.is_whitespace());
        if disposition_type.is_empty() {
            return Err(DispositionError::MissingType);
        }
        if !is_token(disposition_type) {
            return Err(DispositionError::InvalidType(disposition_type.to_string()));
        }

        let mut params = Vec::new();
        loop {
            cursor.skip_whitespace();
            match cursor.next() {
                None => break,
                Some(';') => {}
                Some(found) => {
                    return Err(DispositionError::UnexpectedCharacter {
                        found,
                        offset: cursor.offset() - found.len_utf8(),
                    })
                }
            }
            cursor.skip_whitespace();
            if cursor.peek().is_none() {
                // Trailing semicolon.
                break;
            }

            let key_offset = cursor.offset();
            let key = cursor.take_while(|c| c != '=' && c != ';' && !c.is_whitespace());
            if !is_token(key) {
                return Err(DispositionError::InvalidParameter(key_offset));
            }
            cursor.skip_whitespace();
            if cursor.next() != Some('=') {
                return Err(DispositionError::MissingValue(key.to_string()));
            }
            cursor.skip_whitespace();

            let value = if cursor.peek() == Some('"') {
                cursor.next();
                cursor
                    .take_quoted()
                    .ok_or_else(|| DispositionError::UnterminatedQuote(key.to_string()))?
            } else {
                let raw = cursor.take_while(|c| c != ';' && !c.is_whitespace());
                if raw.is_empty() {
                    return Err(DispositionError::MissingValue(key.to_string()));
                }
                raw.to_string()
            };
            params.push((key.to_ascii_lowercase(), value));
        }

        Ok(Self {
            disposition_type: disposition_type.to_ascii_lowercase(),
            params,
        })
    }

    pub fn disposition_type(&self) -> &str {
        &self.disposition_type
    }

    /// Raw parameter value, keys compared case-insensitively.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The `name` parameter of a form-data disposition.
    pub fn name(&self) -> Option<&str> {
        self.param("name")
    }

    /// The filename, preferring a decodable `filename*` over `filename`.
    pub fn filename(&self) -> Result<Option<String>, DispositionError> {
        if let Some(ext) = self.param("filename*") {
            return decode_ext_value(ext)
                .map(Some)
                .ok_or_else(|| DispositionError::InvalidExtendedValue("filename*".to_string()));
        }
        Ok(self
            .param("filename")
            .filter(|f| !f.is_empty())
            .map(str::to_string))
    }
}

impl fmt::Display for ContentDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.disposition_type)?;
        for (key, value) in &self.params {
            if value.is_ascii() {
                write!(f, "; {}=\"{}\"", key, escape_quoted(value))?;
            } else {
                write!(f, "; {}=\"{}\"", key, escape_quoted(&ascii_fallback(value)))?;
                write!(f, "; {}*=UTF-8''{}", key, percent_encode(value))?;
            }
        }
        Ok(())
    }
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn offset(&self) -> usize {
        self.pos
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    /// Reads up to the closing quote, unescaping `\x`. Opening quote already consumed.
    fn take_quoted(&mut self) -> Option<String> {
        let mut out = String::new();
        loop {
            match self.next()? {
                '"' => return Some(out),
                '\\' => out.push(self.next()?),
                c => out.push(c),
            }
        }
    }
}

fn escape_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push('_'),
            c => out.push(c),
        }
    }
    out
}

fn ascii_fallback(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect()
}

fn is_attr_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#' | b'$' | b'&' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~'
        )
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for b in value.bytes() {
        if is_attr_char(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Decodes an RFC 5987 `charset'language'value`.
fn decode_ext_value(ext: &str) -> Option<String> {
    let mut pieces = ext.splitn(3, '\'');
    let charset = pieces.next()?;
    let _language = pieces.next()?;
    let encoded = pieces.next()?;

    let mut bytes = Vec::with_capacity(encoded.len());
    let raw = encoded.as_bytes();
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'%' {
            let hex = encoded.get(i + 1..i + 3)?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            bytes.push(raw[i]);
            i += 1;
        }
    }

    if charset.eq_ignore_ascii_case("utf-8") {
        String::from_utf8(bytes).ok()
    } else if charset.eq_ignore_ascii_case("iso-8859-1") {
        Some(bytes.into_iter().map(char::from).collect())
    } else {
        None
    }
}
