//! Configuration schema definitions.

use crate::paths;
use crate::secret::SecretString;
use serde::{Deserialize, Serialize};

/// Main wadesk configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// WhatsApp Cloud API settings.
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    /// Datastore settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Webhook ingestion behavior.
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind mode.
    #[serde(default)]
    pub bind: BindMode,

    /// Port number.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on the send endpoints. Unset means open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<SecretString>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: BindMode::default(),
            port: default_port(),
            api_token: None,
        }
    }
}

fn default_port() -> u16 {
    8080
}

/// Network bind mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Bind to loopback only (127.0.0.1). A reverse proxy terminates TLS.
    #[default]
    Loopback,

    /// Bind to all interfaces.
    Lan,
}

/// WhatsApp Cloud API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    /// Graph API access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<SecretString>,

    /// Business phone number id messages are sent from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number_id: Option<String>,

    /// Token the provider presents during the webhook handshake.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_token: Option<SecretString>,

    /// Graph API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout for provider calls, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Language code used for template messages.
    #[serde(default = "default_template_language")]
    pub template_language: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            phone_number_id: None,
            verify_token: None,
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
            template_language: default_template_language(),
        }
    }
}

impl WhatsAppConfig {
    /// Whether outbound sending is possible.
    pub fn can_send(&self) -> bool {
        self.access_token.as_ref().is_some_and(|t| !t.is_empty())
            && self.phone_number_id.as_ref().is_some_and(|p| !p.is_empty())
    }
}

fn default_api_base() -> String {
    "https://graph.facebook.com/v18.0".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_template_language() -> String {
    "es".to_string()
}

/// Datastore settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// sqlx connection URL, e.g. `sqlite:///var/lib/wadesk/wadesk.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    match paths::database_file() {
        Ok(path) => format!("sqlite://{}", path.display()),
        Err(_) => "sqlite://wadesk.db".to_string(),
    }
}

/// Webhook ingestion behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// What to do when a provider message id has already been stored.
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,

    /// Name new contacts after their WhatsApp profile instead of `Usuario <phone>`.
    #[serde(default)]
    pub use_profile_names: bool,
}

/// Handling of repeated provider message ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Append every delivery, even when the id was seen before.
    #[default]
    Allow,

    /// Keep the first row and ignore later deliveries of the same id.
    Skip,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG`/`WADESK_LOG` are unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
