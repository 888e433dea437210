//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the invocation handler
//! - Wire up middleware (tracing, timeout, body limit, correlation id)
//! - Bind the server to a listener and drain it on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::consumer::ConsumerRegistry;
use crate::dispatch::Dispatcher;
use crate::http::correlation::{CorrelationIdGenerator, MakeCorrelationId, UuidGenerator};
use crate::http::handlers;
use crate::lifecycle::shutdown::wait_for;
use crate::routing::AliasResolver;

const DEFAULT_CORRELATION_HEADER: &str = "x-correlation-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub correlation: Arc<dyn CorrelationIdGenerator>,
    pub correlation_header: HeaderName,
    pub prefix: Arc<str>,
}

/// HTTP server exposing registered consumers.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a server generating UUID v4 correlation ids.
    pub fn new(config: GatewayConfig, registry: Arc<dyn ConsumerRegistry>) -> Self {
        Self::with_generator(config, registry, Arc::new(UuidGenerator))
    }

    /// Create a server with a custom correlation id generator.
    pub fn with_generator(
        config: GatewayConfig,
        registry: Arc<dyn ConsumerRegistry>,
        correlation: Arc<dyn CorrelationIdGenerator>,
    ) -> Self {
        let mut dispatcher = Dispatcher::new(registry);
        if !config.routing.aliases.is_empty() {
            dispatcher = dispatcher.with_resolver(Arc::new(AliasResolver::new(config.routing.aliases.clone())));
        }

        let correlation_header = HeaderName::from_bytes(config.api.correlation_header.as_bytes())
            .unwrap_or_else(|_| {
                tracing::error!(
                    header = %config.api.correlation_header,
                    "Invalid correlation header name, using default"
                );
                HeaderName::from_static(DEFAULT_CORRELATION_HEADER)
            });

        let state = AppState {
            dispatcher,
            correlation,
            correlation_header,
            prefix: Arc::from(config.api.prefix.as_str()),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let header = state.correlation_header.clone();
        let make_id = MakeCorrelationId::new(state.correlation.clone());
        let route = format!("{}/{{*remainder}}", config.api.prefix);

        Router::new()
            .route(&route, get(handlers::invoke).post(handlers::invoke))
            .fallback(handlers::not_found)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(header.clone(), make_id))
                    .layer(PropagateRequestIdLayer::new(header))
                    .layer(TraceLayer::new_for_http())
                    .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The fully layered router, for serving in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown is received on `shutdown`.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.config.api.prefix,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
