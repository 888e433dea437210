//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use bytes::Bytes;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use feed_gateway::client::GatewayClient;
use feed_gateway::consumer::builtin::Echo;
use feed_gateway::payload::{MimeType, PayloadList};
use feed_gateway::{ConsumerError, FailureKind, GatewayConfig, GatewayServer, RetryHint, Shutdown, StaticRegistry};

pub const BOUNDARY: &str = "TEST-BOUNDARY-1234";

/// Registry with one consumer per behaviour the tests exercise.
///
/// `calls` counts invocations of the `counted` consumer.
pub fn test_registry(calls: Arc<AtomicUsize>) -> StaticRegistry {
    StaticRegistry::new()
        .register("echo", Echo)
        .register("counted", move |inputs: PayloadList| -> Result<PayloadList, ConsumerError> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(inputs)
        })
        .register("names", |inputs: PayloadList| -> Result<PayloadList, ConsumerError> {
            let names: Vec<&str> = inputs.names().collect();
            let mut builder = PayloadList::builder();
            builder
                .add_text("names", names.join(","))
                .map_err(|e| ConsumerError::new(FailureKind::Internal, e.to_string()))?;
            Ok(builder.build())
        })
        .register("empty", |_: PayloadList| -> Result<PayloadList, ConsumerError> { Ok(PayloadList::empty()) })
        .register("report", |_: PayloadList| -> Result<PayloadList, ConsumerError> {
            let mut builder = PayloadList::builder();
            builder
                .add_file(
                    "report",
                    Bytes::from_static(b"%PDF-1.7"),
                    MimeType::new("application", "pdf", None).map_err(|e| ConsumerError::new(FailureKind::Internal, e.to_string()))?,
                    "out/report.pdf",
                )
                .map_err(|e| ConsumerError::new(FailureKind::Internal, e.to_string()))?;
            Ok(builder.build())
        })
        .register("bad", |_: PayloadList| -> Result<PayloadList, ConsumerError> {
            Err(ConsumerError::new(FailureKind::CallerFixable, "bad field"))
        })
        .register("broken", |_: PayloadList| -> Result<PayloadList, ConsumerError> {
            Err(ConsumerError::new(FailureKind::Internal, "backend unavailable")
                .with_retry(RetryHint::Retry)
                .with_source(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "db.internal:5432")))
        })
        .register("boom", |_: PayloadList| -> Result<PayloadList, ConsumerError> { panic!("consumer bug") })
}

/// Config suitable for tests: no metrics endpoint.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.observability.metrics_enabled = false;
    config
}

/// In-process router over [`test_registry`].
pub fn router(calls: Arc<AtomicUsize>) -> Router {
    router_with(test_config(), calls)
}

pub fn router_with(config: GatewayConfig, calls: Arc<AtomicUsize>) -> Router {
    GatewayServer::new(config, Arc::new(test_registry(calls))).router()
}

/// A gateway serving [`test_registry`] on an ephemeral port.
pub struct RunningGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningGateway {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client talking to this gateway directly, bypassing any environment proxy.
    pub fn client(&self) -> GatewayClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        GatewayClient::new(self.base_url()).with_http_client(http)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .expect("server task panicked")
            .expect("server failed");
    }
}

pub async fn start_gateway(calls: Arc<AtomicUsize>) -> RunningGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = GatewayServer::new(test_config(), Arc::new(test_registry(calls)));
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, rx).await });
    RunningGateway { addr, shutdown, handle }
}

/// Part of a hand-built multipart body.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub content: &'a [u8],
}

/// Build a `multipart/form-data` body delimited by [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{}\"", filename));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(ct) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
