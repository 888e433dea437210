//! Consumer invocation handler.
//!
//! # Data Flow
//! ```text
//! GET  /<prefix>/<name>?q          → query            + metadata
//! POST multipart/form-data         → form parts + query + metadata
//! POST anything else               → body       + query + metadata
//!     → Dispatcher (blocking pool) → encode → correlation header
//! ```
//!
//! Metadata is the correlation id payload; it always comes last.

use std::time::Instant;

use axum::extract::{Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use tracing::Instrument;

use crate::consumer::{FailureKind, RetryHint};
use crate::decode::body::{decode_body, parse_content_type, parse_disposition_header};
use crate::decode::multipart::{boundary, decode_multipart, PartPolicy};
use crate::decode::query::decode_raw_query;
use crate::decode::DecodeError;
use crate::dispatch::DispatchFailure;
use crate::encode::encode_payloads;
use crate::error::GatewayError;
use crate::http::response::{failure_response, with_correlation};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::payload::{is_reserved, PayloadList, BODY_BYTES_PAYLOAD, CORRELATION_ID_PAYLOAD};

/// Entry point for `GET|HEAD|POST <prefix>/{*remainder}`.
pub async fn invoke(
    State(state): State<AppState>,
    Path(remainder): Path<String>,
    request: Request,
) -> Response {
    let start = Instant::now();
    let supplied = request
        .headers()
        .get(&state.correlation_header)
        .and_then(|v| v.to_str().ok());
    let correlation_id = state.correlation.generate(supplied);
    let resource = format!("{}/{}", state.prefix, remainder);

    let span = tracing::info_span!("request", correlation_id = %correlation_id, consumer = %remainder);
    async move {
        tracing::debug!(method = %request.method(), resource = %resource, "Invoking consumer");

        let response = match handle(&state, &remainder, &correlation_id, request).await {
            Ok(response) => response,
            Err(err) => failure_response(&err, &resource),
        };
        let response = with_correlation(response, &state.correlation_header, &correlation_id);

        tracing::info!(status = response.status().as_u16(), "Request complete");
        metrics::record_request(&state.dispatcher.metric_label(&remainder), response.status().as_u16(), start);
        response
    }
    .instrument(span)
    .await
}

/// Unmatched paths.
pub async fn not_found(uri: Uri) -> Response {
    tracing::debug!(path = %uri.path(), "No route matched");
    (
        axum::http::StatusCode::NOT_FOUND,
        format!("Resource '{}' does not exist.", uri.path()),
    )
        .into_response()
}

async fn handle(
    state: &AppState,
    remainder: &str,
    correlation_id: &str,
    request: Request,
) -> Result<Response, GatewayError> {
    let (parts, body) = request.into_parts();
    log_headers(&parts.headers);

    let query = decode_raw_query(parts.uri.query())?;
    warn_reserved(&query);
    let metadata = metadata(correlation_id)?;

    let inputs = if parts.method == Method::POST {
        let content_type = parse_content_type(&parts.headers)?;
        if content_type.is_multipart_form_data() {
            let raw = parts
                .headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            let form = decode_multipart(body.into_data_stream(), boundary(raw)?, PartPolicy::Request).await?;
            warn_reserved(&form);
            PayloadList::concat([&form, &query, &metadata])
        } else {
            // Disposition first: a bad header must never reach a consumer.
            let disposition = parse_disposition_header(&parts.headers)?;
            let bytes = axum::body::to_bytes(body, usize::MAX)
                .await
                .map_err(|e| DecodeError::body_read(e.into()))?;
            let body = decode_body(BODY_BYTES_PAYLOAD, bytes, content_type, disposition.as_ref())?;
            PayloadList::concat([&body, &query, &metadata])
        }
    } else {
        PayloadList::concat([&query, &metadata])
    };

    let outputs = dispatch(state, remainder, inputs).await?;
    Ok(encode_payloads(&outputs)?)
}

/// Run the consumer on the blocking pool, inside the request span.
async fn dispatch(state: &AppState, remainder: &str, inputs: PayloadList) -> Result<PayloadList, GatewayError> {
    let dispatcher = state.dispatcher.clone();
    let name = remainder.to_string();
    let span = tracing::Span::current();

    let joined = tokio::task::spawn_blocking(move || span.in_scope(|| dispatcher.dispatch(&name, inputs))).await;
    match joined {
        Ok(result) => Ok(result?),
        Err(e) => {
            tracing::error!(error = %e, "Consumer task did not complete");
            Err(GatewayError::Dispatch(DispatchFailure {
                kind: FailureKind::Unclassified,
                message: "consumer task did not complete".to_string(),
                retry: RetryHint::Fail,
            }))
        }
    }
}

fn metadata(correlation_id: &str) -> Result<PayloadList, DecodeError> {
    let mut builder = PayloadList::builder();
    builder.add_text(CORRELATION_ID_PAYLOAD, correlation_id)?;
    Ok(builder.build())
}

fn warn_reserved(list: &PayloadList) {
    for name in list.names().filter(|n| is_reserved(n)) {
        tracing::warn!(name = %name, "Caller supplied a payload name in the reserved namespace");
    }
}

fn log_headers(headers: &HeaderMap) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        for (name, value) in headers {
            tracing::debug!(header = %name, value = ?value, "Request header");
        }
    }
}
