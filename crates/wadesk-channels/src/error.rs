//! Channel error types.

use thiserror::Error;

/// Errors that can occur talking to WhatsApp.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The Cloud API answered with a non-success status.
    #[error("WhatsApp API Error: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// `error.message` from the response body.
        message: String,
    },

    /// Handshake or request is missing required parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Handshake token mismatch.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Channel configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ChannelError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Message to hand back to API callers.
    ///
    /// For provider rejections this is the provider's own explanation.
    pub fn provider_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
