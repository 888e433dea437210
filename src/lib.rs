//! Feed Gateway Library
//!
//! Exposes named consumers over HTTP: decodes requests into payload lists,
//! dispatches them to a consumer and encodes the consumer's output.

pub mod client;
pub mod config;
pub mod consumer;
pub mod decode;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod payload;
pub mod routing;

pub use config::GatewayConfig;
pub use consumer::{Consumer, ConsumerError, ConsumerRegistry, FailureKind, RetryHint, StaticRegistry};
pub use error::GatewayError;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use payload::{Payload, PayloadList, PayloadListBuilder};
