//! Message persistence with validation and duplicate handling.

use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use wadesk_core::config::DuplicatePolicy;
use wadesk_core::{Message, NewMessage};
use wadesk_store::{Store, StoreError};

use crate::error::GatewayError;

/// Result of a record call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new row was stored.
    Recorded(Message),
    /// The provider id was already stored; nothing was written.
    Duplicate(Message),
}

impl RecordOutcome {
    /// The stored (or pre-existing) message.
    pub fn message(&self) -> &Message {
        match self {
            Self::Recorded(m) | Self::Duplicate(m) => m,
        }
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid message: {0}")]
    Invalid(&'static str),

    #[error("Failed to store message: {0}")]
    Store(#[from] StoreError),
}

impl From<RecordError> for GatewayError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::Invalid(_) => Self::BadRequest(err.to_string()),
            RecordError::Store(_) => Self::Store(err.to_string()),
        }
    }
}

/// Appends messages to a contact's conversation.
#[derive(Clone)]
pub struct MessageRecorder {
    store: Arc<dyn Store>,
    policy: DuplicatePolicy,
}

impl MessageRecorder {
    pub fn new(store: Arc<dyn Store>, policy: DuplicatePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub async fn record(&self, message: NewMessage) -> Result<RecordOutcome, RecordError> {
        if message.contact_id.trim().is_empty() {
            return Err(RecordError::Invalid("contact_id is required"));
        }
        // Only the empty string counts as missing; whitespace is stored as sent
        if message.content.is_empty() {
            return Err(RecordError::Invalid("content is required"));
        }

        if self.policy == DuplicatePolicy::Skip {
            if let Some(external_id) = message.whatsapp_message_id.as_deref() {
                if let Some(existing) = self.store.find_message_by_external_id(external_id).await? {
                    debug!(external_id, "Skipping already stored message");
                    return Ok(RecordOutcome::Duplicate(existing));
                }
            }
        }

        let stored = self.store.create_message(message).await?;
        debug!(
            message_id = %stored.id,
            contact_id = %stored.contact_id,
            direction = %stored.direction,
            "Recorded message"
        );
        Ok(RecordOutcome::Recorded(stored))
    }
}
