//! Gateway error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use wadesk_store::StoreError;

/// HTTP-facing errors. Each variant maps to one status code and renders as
/// `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or invalid request data.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or wrong API token.
    #[error("{0}")]
    Unauthorized(String),

    /// Handshake token mismatch.
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Verb not supported on this route.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Datastore failure.
    #[error("{0}")]
    Store(String),

    /// The provider rejected or failed the send.
    #[error("{0}")]
    SendFailed(String),

    /// A required setting is missing.
    #[error("{0}")]
    NotConfigured(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::SendFailed(_) => StatusCode::BAD_GATEWAY,
            Self::Store(_) | Self::NotConfigured(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        Self::Store(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GatewayError::BadRequest("x".into()), 400),
            (GatewayError::Unauthorized("x".into()), 401),
            (GatewayError::Forbidden("x".into()), 403),
            (GatewayError::NotFound("x".into()), 404),
            (GatewayError::MethodNotAllowed, 405),
            (GatewayError::Store("x".into()), 500),
            (GatewayError::SendFailed("x".into()), 502),
            (GatewayError::NotConfigured("x".into()), 500),
            (GatewayError::Internal("x".into()), 500),
        ];
        for (err, code) in cases {
            assert_eq!(err.status().as_u16(), code, "{err:?}");
        }
    }

    #[test]
    fn test_message_is_bare() {
        assert_eq!(GatewayError::Forbidden("Forbidden".into()).to_string(), "Forbidden");
        assert_eq!(GatewayError::MethodNotAllowed.to_string(), "Method not allowed");
    }
}
