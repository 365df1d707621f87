//! WhatsApp Cloud API integration for wadesk.
//!
//! This crate provides:
//! - The [`Provider`] trait the dispatcher sends through, and
//!   [`WhatsAppProvider`], its Cloud API implementation
//! - Webhook payload types and the content extraction policy
//! - Webhook handshake verification

pub mod error;
pub mod provider;
pub mod webhook;

pub use error::ChannelError;
pub use provider::{Provider, SendResponse, WhatsAppProvider, WHATSAPP_API_BASE};
pub use webhook::{
    extract_content, verify_handshake, WebhookChange, WebhookContact, WebhookEntry,
    RawElement, WebhookMessage, WebhookPayload, WebhookStatus, WebhookValue,
};

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
