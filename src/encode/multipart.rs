//! `multipart/form-data` body writer.

use bytes::{BufMut, Bytes, BytesMut};

use crate::decode::disposition::ContentDisposition;
use crate::payload::MimeType;

/// Accumulates parts into a single in-memory `multipart/form-data` body.
#[derive(Debug)]
pub struct MultipartWriter {
    boundary: String,
    buf: BytesMut,
    parts: usize,
}

impl MultipartWriter {
    /// Writer with a freshly generated random boundary.
    pub fn new() -> Self {
        Self::with_boundary(format!("Boundary_{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buf: BytesMut::new(),
            parts: 0,
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// `multipart/form-data; boundary=...`
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Plain field part: name and content type, no filename.
    pub fn field(&mut self, name: &str, content_type: &MimeType, content: &[u8]) -> &mut Self {
        let disposition = ContentDisposition::new(ContentDisposition::FORM_DATA).with_param("name", name);
        self.part(&disposition, content_type, content)
    }

    /// File part: name, filename and content type.
    pub fn file(&mut self, name: &str, filename: &str, content_type: &MimeType, content: &[u8]) -> &mut Self {
        let disposition = ContentDisposition::new(ContentDisposition::FORM_DATA)
            .with_param("name", name)
            .with_param("filename", filename);
        self.part(&disposition, content_type, content)
    }

    fn part(&mut self, disposition: &ContentDisposition, content_type: &MimeType, content: &[u8]) -> &mut Self {
        self.buf.put_slice(b"--");
        self.buf.put_slice(self.boundary.as_bytes());
        self.buf.put_slice(b"\r\n");
        self.buf
            .put_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
        self.buf
            .put_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        self.buf.put_slice(content);
        self.buf.put_slice(b"\r\n");
        self.parts += 1;
        self
    }

    pub fn part_count(&self) -> usize {
        self.parts
    }

    /// Close the body and return it.
    pub fn finish(mut self) -> Bytes {
        self.buf.put_slice(b"--");
        self.buf.put_slice(self.boundary.as_bytes());
        self.buf.put_slice(b"--\r\n");
        self.buf.freeze()
    }
}

impl Default for MultipartWriter {
    fn default() -> Self {
        Self::new()
    }
}
