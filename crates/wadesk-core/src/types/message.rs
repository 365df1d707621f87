//! Message types.

use crate::error::Error;
use crate::types::ContactStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which way a message travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Received from the contact.
    Inbound,
    /// Sent to the contact.
    Outbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(Self::Inbound),
            "outbound" => Ok(Self::Outbound),
            other => Err(Error::unknown("message direction", other)),
        }
    }
}

/// Delivery state of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "read" => Ok(Self::Read),
            "failed" => Ok(Self::Failed),
            other => Err(Error::unknown("message status", other)),
        }
    }
}

/// A stored message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier.
    pub id: String,

    /// Owning contact.
    pub contact_id: String,

    /// Text content (or a placeholder label for media).
    pub content: String,

    /// Inbound or outbound.
    pub direction: Direction,

    /// Delivery state at the time of recording.
    pub status: MessageStatus,

    /// Provider message id (`wamid...`), when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_message_id: Option<String>,

    /// Insert timestamp.
    pub sent_at: DateTime<Utc>,
}

/// Fields supplied when appending a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub contact_id: String,
    pub content: String,
    pub direction: Direction,
    pub status: MessageStatus,
    pub whatsapp_message_id: Option<String>,
}

impl NewMessage {
    /// An inbound message as delivered by the webhook; stored as `read`.
    pub fn inbound(
        contact_id: impl Into<String>,
        content: impl Into<String>,
        whatsapp_message_id: Option<String>,
    ) -> Self {
        Self {
            contact_id: contact_id.into(),
            content: content.into(),
            direction: Direction::Inbound,
            status: MessageStatus::Read,
            whatsapp_message_id,
        }
    }

    /// An outbound message accepted by the provider; stored as `sent`.
    pub fn outbound(
        contact_id: impl Into<String>,
        content: impl Into<String>,
        whatsapp_message_id: Option<String>,
    ) -> Self {
        Self {
            contact_id: contact_id.into(),
            content: content.into(),
            direction: Direction::Outbound,
            status: MessageStatus::Sent,
            whatsapp_message_id,
        }
    }

    /// Materialize the message with a fresh id and timestamp.
    pub fn into_message(self, now: DateTime<Utc>) -> Message {
        Message {
            id: uuid::Uuid::new_v4().to_string(),
            contact_id: self.contact_id,
            content: self.content,
            direction: self.direction,
            status: self.status,
            whatsapp_message_id: self.whatsapp_message_id,
            sent_at: now,
        }
    }
}

/// Aggregate counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_contacts: u64,
    pub total_messages: u64,
    pub today_messages: u64,
    pub contacts_by_status: BTreeMap<ContactStatus, u64>,
}
