//! Webhook payloads delivered by the WhatsApp Cloud API.
//!
//! Every collection defaults to empty and most scalars to `None`, so partial
//! or unusual payloads still deserialize; the ingestor decides what to do with
//! missing pieces. Messages, statuses and contacts stay raw JSON until they
//! are read, so one malformed element cannot reject its siblings.

use crate::error::ChannelError;
use crate::Result;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use wadesk_core::SecretString;

/// Label stored for image messages.
pub const IMAGE_LABEL: &str = "📷 Imagen";
/// Label stored for document messages.
pub const DOCUMENT_LABEL: &str = "📄 Documento";
/// Label stored for audio messages.
pub const AUDIO_LABEL: &str = "🎵 Audio";
/// Label stored for video messages.
pub const VIDEO_LABEL: &str = "🎥 Video";
/// Label stored for location messages.
pub const LOCATION_LABEL: &str = "📍 Ubicación";
/// Label stored for any other message type.
pub const UNSUPPORTED_LABEL: &str = "Mensaje no compatible";

/// Top-level webhook body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: WebhookValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookValue {
    #[serde(default)]
    pub messaging_product: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub contacts: Vec<Value>,
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default)]
    pub statuses: Vec<Value>,
}

/// One array element together with its decoded form.
#[derive(Debug)]
pub struct RawElement<'a, T> {
    pub raw: &'a Value,
    pub decoded: serde_json::Result<T>,
}

impl<T> RawElement<'_, T> {
    /// The element's `id`, readable even when decoding failed.
    pub fn id(&self) -> Option<&str> {
        self.raw
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }
}

fn decode_each<'a, T>(items: &'a [Value]) -> impl Iterator<Item = RawElement<'a, T>> + 'a
where
    T: Deserialize<'a> + 'a,
{
    items.iter().map(|raw| RawElement {
        raw,
        decoded: T::deserialize(raw),
    })
}

impl WebhookValue {
    pub fn messages(&self) -> impl Iterator<Item = RawElement<'_, WebhookMessage>> + '_ {
        decode_each(&self.messages)
    }

    pub fn statuses(&self) -> impl Iterator<Item = RawElement<'_, WebhookStatus>> + '_ {
        decode_each(&self.statuses)
    }

    /// WhatsApp profile name reported for a sender, if any.
    pub fn profile_name(&self, wa_id: &str) -> Option<String> {
        decode_each::<WebhookContact>(&self.contacts)
            .filter_map(|c| c.decoded.ok())
            .find(|c| c.wa_id == wa_id)
            .and_then(|c| c.profile)
            .and_then(|p| p.name)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
    }
}

/// Unix seconds arrive as a string, but some senders use a number.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookContact {
    #[serde(default)]
    pub wa_id: String,
    #[serde(default)]
    pub profile: Option<WebhookProfile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookProfile {
    #[serde(default)]
    pub name: Option<String>,
}

/// An inbound message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub from: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub text: Option<TextContent>,
    #[serde(default)]
    pub interactive: Option<Interactive>,
    #[serde(default)]
    pub button: Option<ButtonContent>,
    #[serde(default)]
    pub image: Option<Value>,
    #[serde(default)]
    pub document: Option<Value>,
    #[serde(default)]
    pub audio: Option<Value>,
    #[serde(default)]
    pub video: Option<Value>,
    #[serde(default)]
    pub location: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextContent {
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Interactive {
    #[serde(rename = "type", default)]
    pub interactive_type: Option<String>,
    #[serde(default)]
    pub button_reply: Option<Reply>,
    #[serde(default)]
    pub list_reply: Option<Reply>,
}

/// A button or list selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Reply {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Legacy quick-reply button.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ButtonContent {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
}

/// A delivery status update for a message we sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookStatus {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub recipient_id: String,
}

impl WebhookStatus {
    /// Whether this status should make sure the recipient exists as a contact.
    pub fn ensures_contact(&self) -> bool {
        matches!(self.status.as_str(), "delivered" | "sent")
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn reply_text(reply: Option<&Reply>) -> Option<String> {
    let reply = reply?;
    non_empty(&reply.title)
        .or_else(|| non_empty(&reply.id))
        .map(str::to_string)
}

/// Text to store for an inbound message. First matching shape wins.
pub fn extract_content(message: &WebhookMessage) -> String {
    if let Some(body) = message.text.as_ref().and_then(|t| non_empty(&t.body)) {
        return body.to_string();
    }

    if let Some(interactive) = &message.interactive {
        match interactive.interactive_type.as_deref() {
            Some("button_reply") => {
                if let Some(text) = reply_text(interactive.button_reply.as_ref()) {
                    return text;
                }
            }
            Some("list_reply") => {
                if let Some(text) = reply_text(interactive.list_reply.as_ref()) {
                    return text;
                }
            }
            _ => {}
        }
    }

    if let Some(button) = &message.button {
        if let Some(text) = non_empty(&button.text).or_else(|| non_empty(&button.payload)) {
            return text.to_string();
        }
    }

    let label = if message.image.is_some() {
        IMAGE_LABEL
    } else if message.document.is_some() {
        DOCUMENT_LABEL
    } else if message.audio.is_some() {
        AUDIO_LABEL
    } else if message.video.is_some() {
        VIDEO_LABEL
    } else if message.location.is_some() {
        LOCATION_LABEL
    } else {
        UNSUPPORTED_LABEL
    };
    label.to_string()
}

/// Answer the subscription handshake.
///
/// Returns the challenge to echo back when `mode` is `subscribe` and `token`
/// matches the configured secret.
pub fn verify_handshake(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    expected: Option<&SecretString>,
) -> Result<String> {
    let (mode, token, challenge) = match (mode, token, challenge) {
        (Some(m), Some(t), Some(c)) if !m.is_empty() && !t.is_empty() && !c.is_empty() => {
            (m, t, c)
        }
        _ => {
            return Err(ChannelError::InvalidRequest(
                "Missing required parameters".to_string(),
            ))
        }
    };

    let expected = expected
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ChannelError::config("Webhook verify token not configured"))?;

    if mode == "subscribe" && expected.matches(token) {
        Ok(challenge.to_string())
    } else {
        Err(ChannelError::Auth("Invalid verify token".to_string()))
    }
}
