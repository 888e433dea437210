//! HTTP client for gateway consumers.
//!
//! # Responsibilities
//! - Turn a payload list into the request shape the gateway decodes
//! - Decode the gateway's response back into a payload list
//! - Surface failures with the gateway's message and correlation id
//!
//! # Design Decisions
//! - Empty list → GET; otherwise multipart/form-data POST
//! - Text payloads go out as simple fields, byte payloads as typed parts

use bytes::Bytes;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::decode::disposition::ContentDisposition;
use crate::decode::response::decode_response;
use crate::decode::DecodeError;
use crate::payload::{MimeType, PayloadList};

/// Name given to a single, non-multipart response body.
pub const RESPONSE_BODY_NAME: &str = "body";

/// Errors raised by [`GatewayClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway returned {status}: {message}")]
    Status {
        status: u16,
        message: String,
        correlation_id: Option<String>,
    },

    #[error("failed to decode gateway response: {0}")]
    Decode(#[from] DecodeError),
}

/// A successful consumer invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub status: u16,
    pub correlation_id: Option<String>,
    pub payloads: PayloadList,
}

/// Client for one gateway instance.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    prefix: String,
    correlation_header: String,
}

impl GatewayClient {
    /// Client for the gateway at `base_url` using the default API prefix and header.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            prefix: "/api/v1".to_string(),
            correlation_header: "X-Correlation-ID".to_string(),
        }
    }

    /// Use a preconfigured reqwest client (timeouts, proxies, TLS).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_correlation_header(mut self, header: impl Into<String>) -> Self {
        self.correlation_header = header.into();
        self
    }

    /// URL of `consumer` on this gateway.
    pub fn url(&self, consumer: &str) -> String {
        format!("{}{}/{}", self.base_url, self.prefix, consumer)
    }

    /// Invoke `consumer` with `payloads`.
    pub async fn invoke(
        &self,
        consumer: &str,
        payloads: &PayloadList,
        correlation_id: Option<&str>,
    ) -> Result<Invocation, ClientError> {
        let request = if payloads.is_empty() {
            self.http.get(self.url(consumer))
        } else {
            self.http.post(self.url(consumer)).multipart(form(payloads)?)
        };
        let request = match correlation_id {
            Some(id) => request.header(self.correlation_header.as_str(), id),
            None => request,
        };
        tracing::debug!(consumer = %consumer, payloads = payloads.len(), "Invoking consumer");
        self.finish(request.send().await?).await
    }

    /// Invoke `consumer` with a single raw body.
    pub async fn invoke_body(
        &self,
        consumer: &str,
        body: Bytes,
        content_type: &MimeType,
        filename: Option<&str>,
        correlation_id: Option<&str>,
    ) -> Result<Invocation, ClientError> {
        let mut request = self
            .http
            .post(self.url(consumer))
            .header(CONTENT_TYPE, content_type.to_string())
            .body(body);
        if let Some(filename) = filename {
            let disposition = ContentDisposition::new(ContentDisposition::INLINE).with_param("filename", filename);
            request = request.header(CONTENT_DISPOSITION, disposition.to_string());
        }
        if let Some(id) = correlation_id {
            request = request.header(self.correlation_header.as_str(), id);
        }
        self.finish(request.send().await?).await
    }

    async fn finish(&self, response: reqwest::Response) -> Result<Invocation, ClientError> {
        let status = response.status();
        let headers = response.headers().clone();
        let correlation_id = headers
            .get(self.correlation_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
                correlation_id,
            });
        }

        let payloads = decode_response(status, &headers, body, RESPONSE_BODY_NAME).await?;
        Ok(Invocation {
            status: status.as_u16(),
            correlation_id,
            payloads,
        })
    }
}

fn form(payloads: &PayloadList) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for payload in payloads {
        let part = match payload.as_text() {
            Some(text) => Part::text(text.to_string()),
            None => {
                let part = Part::bytes(payload.as_bytes().to_vec()).mime_str(&payload.content_type().to_string())?;
                match payload.file_base_name() {
                    Some(name) => part.file_name(name.to_string()),
                    None => part,
                }
            }
        };
        form = form.part(payload.name().to_string(), part);
    }
    Ok(form)
}
