//! WhatsApp Cloud API provider.
//!
//! The dispatcher talks to WhatsApp through the [`Provider`] trait so it can be
//! exercised without network access. [`WhatsAppProvider`] is the real
//! implementation on top of the Graph API `/{phone_number_id}/messages`
//! endpoint.

use crate::error::ChannelError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use wadesk_core::config::WhatsAppConfig;
use wadesk_core::{phone, SecretString};

/// WhatsApp Cloud API base URL.
pub const WHATSAPP_API_BASE: &str = "https://graph.facebook.com/v18.0";

/// Outcome of an accepted send.
#[derive(Debug, Clone, PartialEq)]
pub struct SendResponse {
    /// Response body exactly as the provider returned it.
    pub raw: Value,

    /// `messages[0].id`, when present.
    pub message_id: Option<String>,
}

impl SendResponse {
    /// Wrap a provider response body.
    pub fn from_raw(raw: Value) -> Self {
        let message_id = raw
            .get("messages")
            .and_then(|m| m.get(0))
            .and_then(|m| m.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { raw, message_id }
    }
}

/// Outbound messaging seam.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, to: &str, body: &str) -> Result<SendResponse>;

    /// Send a pre-approved template with positional body parameters.
    async fn send_template(
        &self,
        to: &str,
        name: &str,
        language: &str,
        params: &[String],
    ) -> Result<SendResponse>;
}

#[derive(Debug, Serialize)]
struct TextPayload<'a> {
    messaging_product: &'static str,
    to: String,
    #[serde(rename = "type")]
    message_type: &'static str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct TemplatePayload<'a> {
    messaging_product: &'static str,
    to: String,
    #[serde(rename = "type")]
    message_type: &'static str,
    template: Template<'a>,
}

#[derive(Debug, Serialize)]
struct Template<'a> {
    name: &'a str,
    language: Language<'a>,
    components: Vec<Component<'a>>,
}

#[derive(Debug, Serialize)]
struct Language<'a> {
    code: &'a str,
}

#[derive(Debug, Serialize)]
struct Component<'a> {
    #[serde(rename = "type")]
    component_type: &'static str,
    parameters: Vec<TextParameter<'a>>,
}

#[derive(Debug, Serialize)]
struct TextParameter<'a> {
    #[serde(rename = "type")]
    parameter_type: &'static str,
    text: &'a str,
}

/// Cloud API client.
pub struct WhatsAppProvider {
    phone_number_id: String,
    access_token: SecretString,
    api_base: String,
    client: Client,
}

impl std::fmt::Debug for WhatsAppProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppProvider")
            .field("phone_number_id", &self.phone_number_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl WhatsAppProvider {
    /// Create a provider against the public Graph API.
    pub fn new(phone_number_id: impl Into<String>, access_token: impl Into<SecretString>) -> Self {
        Self {
            phone_number_id: phone_number_id.into(),
            access_token: access_token.into(),
            api_base: WHATSAPP_API_BASE.to_string(),
            client: Client::new(),
        }
    }

    /// Create from configuration.
    pub fn from_config(config: &WhatsAppConfig) -> Result<Self> {
        let access_token = config
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ChannelError::config("Missing whatsapp.access_token"))?;
        let phone_number_id = config
            .phone_number_id
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ChannelError::config("Missing whatsapp.phone_number_id"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            phone_number_id,
            access_token,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Point the client at a different API base, e.g. a mock server.
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.api_base, self.phone_number_id)
    }

    async fn post<T: Serialize + ?Sized>(&self, payload: &T) -> Result<SendResponse> {
        let response = self
            .client
            .post(self.messages_url())
            .bearer_auth(self.access_token.expose_secret())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // The error body may not even be JSON
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or("Unknown error")
                .to_string();
            warn!("WhatsApp API rejected request ({}): {}", status, message);
            return Err(ChannelError::api(status.as_u16(), message));
        }

        let raw: Value = response.json().await?;
        Ok(SendResponse::from_raw(raw))
    }
}

#[async_trait]
impl Provider for WhatsAppProvider {
    async fn send_text(&self, to: &str, body: &str) -> Result<SendResponse> {
        let to = phone::normalize(to);
        debug!("Sending WhatsApp text to {}", to);

        self.post(&TextPayload {
            messaging_product: "whatsapp",
            to,
            message_type: "text",
            text: TextBody { body },
        })
        .await
    }

    async fn send_template(
        &self,
        to: &str,
        name: &str,
        language: &str,
        params: &[String],
    ) -> Result<SendResponse> {
        let to = phone::normalize(to);
        debug!("Sending WhatsApp template '{}' to {}", name, to);

        let components = if params.is_empty() {
            Vec::new()
        } else {
            vec![Component {
                component_type: "body",
                parameters: params
                    .iter()
                    .map(|p| TextParameter {
                        parameter_type: "text",
                        text: p,
                    })
                    .collect(),
            }]
        };

        self.post(&TemplatePayload {
            messaging_product: "whatsapp",
            to,
            message_type: "template",
            template: Template {
                name,
                language: Language { code: language },
                components,
            },
        })
        .await
    }
}
