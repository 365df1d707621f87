//! HTTP gateway for wadesk.
//!
//! This crate provides:
//! - The WhatsApp webhook endpoint (handshake and event delivery)
//! - Outbound sending and registration of externally sent messages
//! - The services behind them: contact resolution, message recording,
//!   webhook ingestion and outbound dispatch

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod recorder;
pub mod resolver;
pub mod server;

#[cfg(test)]
mod testing;

pub use dispatch::{DispatchError, DispatchResult, Dispatcher, RegisterRequest, Registered, SendRequest};
pub use error::GatewayError;
pub use ingest::{EntryOutcome, IngestReport, WebhookIngestor};
pub use recorder::{MessageRecorder, RecordError, RecordOutcome};
pub use resolver::{ContactRef, ContactResolver, ResolveError, Resolved};
pub use server::{create_router, AppState, Gateway, GatewayConfig};

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
