//! Router-level tests: request decoding, status mapping, response shapes
//! and correlation id propagation, driven in-process.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use tower::ServiceExt;

use feed_gateway::decode::response::decode_response;
use feed_gateway::http::RETRY_HEADER;
use feed_gateway::payload::PayloadList;

mod common;
use common::{multipart_body, Part, BOUNDARY};

const CORRELATION: &str = "x-correlation-id";

fn calls() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

async fn send(request: Request<Body>) -> Response {
    common::router(calls()).oneshot(request).await.unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn decoded(response: Response) -> PayloadList {
    let (parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    decode_response(parts.status, &parts.headers, bytes, "body").await.unwrap()
}

fn pairs(list: &PayloadList) -> Vec<(String, String)> {
    list.iter()
        .map(|p| (p.name().to_string(), String::from_utf8_lossy(p.as_bytes()).into_owned()))
        .collect()
}

#[tokio::test]
async fn test_query_multiplicity_is_preserved() {
    let response = send(get("/api/v1/echo?a=1&a=2&b=x")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("multipart/form-data"));

    let payloads = decoded(response).await;
    assert_eq!(
        pairs(&payloads),
        vec![
            ("a".to_string(), "1".to_string()),
            ("a".to_string(), "2".to_string()),
            ("b".to_string(), "x".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_inputs_are_ordered_with_metadata_last() {
    let body = multipart_body(&[
        Part { name: "field", filename: None, content_type: None, content: b"v" },
        Part { name: "doc", filename: Some("doc.bin"), content_type: Some("application/octet-stream"), content: b"\x00\x01" },
    ]);
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/names?q=1")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap();

    let response = send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "field,doc,q,formsfeeder:CorrelationId");

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/names?q=1")
        .header(CONTENT_TYPE, "text/csv")
        .body(Body::from("a,b"))
        .unwrap();
    assert_eq!(body_text(send(request).await).await, "formsfeeder:BodyBytes,q,formsfeeder:CorrelationId");

    assert_eq!(body_text(send(get("/api/v1/names?q=1")).await).await, "q,formsfeeder:CorrelationId");
}

#[tokio::test]
async fn test_multipart_fields_round_trip_through_echo() {
    let body = multipart_body(&[
        Part { name: "text", filename: Some("ignored.txt"), content_type: Some("text/plain; charset=UTF-8"), content: b"hello" },
        Part { name: "doc", filename: Some("scans/doc.pdf"), content_type: Some("application/pdf"), content: b"%PDF" },
    ]);
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/echo")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap();

    let payloads = decoded(send(request).await).await;
    assert_eq!(payloads.len(), 2);

    let text = payloads.get(0).unwrap();
    assert_eq!(text.name(), "text");
    assert_eq!(text.as_text(), Some("hello"));
    assert_eq!(text.filename(), None);

    let doc = payloads.get(1).unwrap();
    assert_eq!(doc.name(), "doc");
    assert_eq!(doc.content_type().essence(), "application/pdf");
    assert_eq!(doc.filename(), Some("doc.pdf"));
    assert_eq!(doc.as_bytes(), b"%PDF");
}

#[tokio::test]
async fn test_multipart_text_field_uses_declared_charset() {
    let body = multipart_body(&[Part {
        name: "city",
        filename: None,
        content_type: Some("text/plain; charset=ISO-8859-1"),
        content: b"Montr\xe9al",
    }]);
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/echo")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap();

    let response = send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=UTF-8");
    assert_eq!(body_text(response).await, "Montréal");
}

#[tokio::test]
async fn test_raw_body_keeps_type_and_disposition() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/echo")
        .header(CONTENT_TYPE, "text/csv")
        .header(CONTENT_DISPOSITION, "attachment; filename=\"data.csv\"")
        .body(Body::from("a,b\n1,2\n"))
        .unwrap();

    let response = send(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/csv");
    assert_eq!(response.headers()[CONTENT_DISPOSITION], "attachment; filename=\"data.csv\"");
    assert_eq!(body_text(response).await, "a,b\n1,2\n");
}

#[tokio::test]
async fn test_malformed_disposition_rejected_before_dispatch() {
    let counter = calls();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/counted")
        .header(CONTENT_TYPE, "application/octet-stream")
        .header(CONTENT_DISPOSITION, "attachment; filename=\"unterminated")
        .header(CORRELATION, "cid-bad-header")
        .body(Body::from("payload"))
        .unwrap();

    let response = common::router(counter.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[CORRELATION], "cid-bad-header");
    assert!(body_text(response).await.contains("Content-Disposition"));
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/counted")
        .header(CONTENT_TYPE, "application/octet-stream")
        .body(Body::from("payload"))
        .unwrap();
    let response = common::router(counter.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_query_name_is_bad_request() {
    let response = send(get("/api/v1/echo?=value")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_consumer_failures_map_to_status() {
    let response = send(get("/api/v1/bad")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[RETRY_HEADER], "FAIL");
    assert!(response.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
    assert_eq!(body_text(response).await, "Consumer detected Bad Request. (bad field)");

    let response = send(get("/api/v1/broken")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.headers()[RETRY_HEADER], "RETRY");
    let text = body_text(response).await;
    assert!(text.contains("backend unavailable"));
    assert!(!text.contains("db.internal"));

    let response = send(get("/api/v1/boom")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = body_text(response).await;
    assert_eq!(text, "Consumer processing error. (unexpected consumer failure)");
    assert!(!text.contains("consumer bug"));
}

#[tokio::test]
async fn test_unknown_consumer_is_not_found() {
    let response = send(get("/api/v1/Missing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(RETRY_HEADER).is_none());
    assert_eq!(body_text(response).await, "Resource '/api/v1/Missing' does not exist.");
}

#[tokio::test]
async fn test_response_shape_by_count() {
    let response = send(get("/api/v1/empty")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_text(response).await.is_empty());

    let response = send(get("/api/v1/report")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
    assert_eq!(response.headers()[CONTENT_DISPOSITION], "inline; filename=\"report.pdf\"");
    assert_eq!(body_text(response).await, "%PDF-1.7");

    let response = send(get("/api/v1/echo?x=1&y=2&z=3")).await;
    let payloads = decoded(response).await;
    assert_eq!(payloads.names().collect::<Vec<_>>(), vec!["x", "y", "z"]);
}

#[tokio::test]
async fn test_correlation_id_is_echoed() {
    let request = Request::builder()
        .uri("/api/v1/names")
        .header(CORRELATION, "caller-42")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;
    assert_eq!(response.headers()[CORRELATION], "caller-42");

    let request = Request::builder()
        .uri("/api/v1/counted")
        .header(CORRELATION, "caller-43")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;
    let payloads = decoded(response).await;
    let id = payloads.first("body").map(|p| p.as_bytes().to_vec());
    assert_eq!(id.as_deref(), Some(&b"caller-43"[..]));
}

#[tokio::test]
async fn test_correlation_id_is_generated_when_absent() {
    let response = send(get("/api/v1/empty")).await;
    let generated = response.headers()[CORRELATION].to_str().unwrap().to_string();
    assert!(!generated.is_empty());

    let other = send(get("/api/v1/empty")).await;
    assert_ne!(other.headers()[CORRELATION].to_str().unwrap(), generated);
}

#[tokio::test]
async fn test_correlation_id_present_on_errors() {
    for uri in ["/api/v1/bad", "/api/v1/Missing", "/elsewhere"] {
        let response = send(get(uri)).await;
        assert!(response.status().is_client_error(), "{uri}");
        assert!(!response.headers()[CORRELATION].is_empty(), "{uri}");
    }

    let request = Request::builder()
        .method("PUT")
        .uri("/api/v1/echo")
        .header(CORRELATION, "cid-put")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[CORRELATION], "cid-put");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let mut config = common::test_config();
    config.limits.max_body_bytes = 8;
    let counter = calls();
    let router = common::router_with(config, counter.clone());

    let body = Bytes::from(vec![b'x'; 64]);
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/counted")
        .header(CONTENT_TYPE, "application/octet-stream")
        .header(CONTENT_LENGTH, body.len())
        .header(CORRELATION, "cid-large")
        .body(Body::from(body))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.headers()[CORRELATION], "cid-large");
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_aliases_resolve_to_consumers() {
    let mut config = common::test_config();
    config
        .routing
        .aliases
        .insert("forms/echo".to_string(), "echo".to_string());
    let router = common::router_with(config, calls());

    let response = router.oneshot(get("/api/v1/forms/echo?a=1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "1");
}
