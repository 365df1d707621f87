//! Outbound messages: sending through the provider and registering messages
//! that were sent by other systems.

use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};
use wadesk_channels::{ChannelError, Provider, SendResponse};
use wadesk_core::{phone, Contact, Message, NewMessage};

use crate::error::GatewayError;
use crate::recorder::{MessageRecorder, RecordError};
use crate::resolver::{ContactRef, ContactResolver, ResolveError};

/// Body of `POST /api/send-message`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl SendRequest {
    pub fn to_contact(contact_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            contact_id: Some(contact_id.into()),
            phone: None,
            message: message.into(),
        }
    }

    pub fn to_phone(phone: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            contact_id: None,
            phone: Some(phone.into()),
            message: message.into(),
        }
    }

    fn target(&self) -> Result<ContactRef, DispatchError> {
        let contact_id = self.contact_id.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let phone = self.phone.as_deref().map(str::trim).filter(|s| !s.is_empty());

        match (contact_id, phone) {
            (Some(id), None) => Ok(ContactRef::Id(id.to_string())),
            (None, Some(phone)) => Ok(ContactRef::phone_named(
                phone,
                phone::short_contact_name(phone),
            )),
            (Some(_), Some(_)) => Err(DispatchError::Invalid(
                "Provide either contactId or phone, not both".to_string(),
            )),
            (None, None) => Err(DispatchError::Invalid(
                "Missing required parameters: contactId or phone".to_string(),
            )),
        }
    }
}

/// Result of a successful send.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub contact: Contact,
    /// Provider message id.
    pub external_id: Option<String>,
    /// Provider response body.
    pub response: serde_json::Value,
    /// The provider accepted the message.
    pub delivered: bool,
    /// The outbound message was stored.
    pub persisted: bool,
    /// Stored message id, when persisted.
    pub message_id: Option<String>,
}

/// Body of `POST /api/register-outbound-message`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub contact_name: Option<String>,
}

/// Result of registering an externally sent message.
#[derive(Debug, Clone)]
pub struct Registered {
    pub contact: Contact,
    pub message: Message,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("WhatsApp sending is not configured")]
    NotConfigured,

    #[error("{}", .0.provider_message())]
    SendFailed(#[source] ChannelError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl From<DispatchError> for GatewayError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Invalid(msg) => Self::BadRequest(msg),
            DispatchError::Resolve(e) => e.into(),
            DispatchError::NotConfigured => Self::NotConfigured(err.to_string()),
            DispatchError::SendFailed(_) => Self::SendFailed(err.to_string()),
            DispatchError::Record(e) => e.into(),
        }
    }
}

/// Sends and records outbound messages.
#[derive(Clone)]
pub struct Dispatcher {
    resolver: ContactResolver,
    recorder: MessageRecorder,
    provider: Option<Arc<dyn Provider>>,
    template_language: String,
}

impl Dispatcher {
    pub fn new(
        resolver: ContactResolver,
        recorder: MessageRecorder,
        provider: Option<Arc<dyn Provider>>,
    ) -> Self {
        Self {
            resolver,
            recorder,
            provider,
            template_language: "es".to_string(),
        }
    }

    pub fn with_template_language(mut self, language: impl Into<String>) -> Self {
        self.template_language = language.into();
        self
    }

    pub fn can_send(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn Provider>, DispatchError> {
        self.provider.as_ref().ok_or(DispatchError::NotConfigured)
    }

    /// Resolve the target, send through the provider, then record.
    ///
    /// Once the provider has accepted the message the dispatch succeeds; a
    /// failure to store it only clears `persisted`.
    pub async fn dispatch(&self, request: SendRequest) -> Result<DispatchResult, DispatchError> {
        if request.message.trim().is_empty() {
            return Err(DispatchError::Invalid(
                "Missing required parameters: message".to_string(),
            ));
        }
        let target = request.target()?;
        let provider = self.provider()?;

        let contact = self.resolver.resolve(target).await?.contact;

        let SendResponse { raw, message_id } = provider
            .send_text(&contact.phone, &request.message)
            .await
            .map_err(DispatchError::SendFailed)?;
        info!(contact_id = %contact.id, external_id = ?message_id, "Message sent");

        let stored = self
            .recorder
            .record(NewMessage::outbound(
                &contact.id,
                request.message,
                message_id.clone(),
            ))
            .await;
        let stored_id = match stored {
            Ok(outcome) => Some(outcome.message().id.clone()),
            Err(e) => {
                error!(contact_id = %contact.id, external_id = ?message_id, "Sent message was not stored: {}", e);
                None
            }
        };

        Ok(DispatchResult {
            contact,
            external_id: message_id,
            response: raw,
            delivered: true,
            persisted: stored_id.is_some(),
            message_id: stored_id,
        })
    }

    /// Send an approved template to a phone. Nothing is stored.
    pub async fn send_template(
        &self,
        phone: &str,
        name: &str,
        params: &[String],
    ) -> Result<SendResponse, DispatchError> {
        if phone::normalize(phone).is_empty() {
            return Err(ResolveError::InvalidPhone(phone.to_string()).into());
        }
        if name.trim().is_empty() {
            return Err(DispatchError::Invalid("Template name is required".to_string()));
        }

        let response = self
            .provider()?
            .send_template(phone, name, &self.template_language, params)
            .await
            .map_err(DispatchError::SendFailed)?;
        info!(template = name, external_id = ?response.message_id, "Template sent");
        Ok(response)
    }

    /// Store an outbound message that another system already delivered.
    pub async fn register_outbound(
        &self,
        request: RegisterRequest,
    ) -> Result<Registered, DispatchError> {
        if request.phone.trim().is_empty() || request.message.trim().is_empty() {
            return Err(DispatchError::Invalid(
                "Phone and message are required".to_string(),
            ));
        }

        let reference = ContactRef::Phone {
            phone: request.phone.trim().to_string(),
            name: request.contact_name,
        };
        let contact = self.resolver.resolve(reference).await?.contact;

        let external_id = format!("auto_{}_{}", Utc::now().timestamp_millis(), contact.id);
        let message = self
            .recorder
            .record(NewMessage::outbound(&contact.id, request.message, Some(external_id)))
            .await?
            .message()
            .clone();
        info!(contact_id = %contact.id, message_id = %message.id, "Registered outbound message");

        Ok(Registered { contact, message })
    }
}
