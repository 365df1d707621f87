//! HTTP route handlers.

use axum::{
    body::Bytes,
    extract::{Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use wadesk_channels::{verify_handshake, ChannelError};

use crate::dispatch::{RegisterRequest, SendRequest};
use crate::error::GatewayError;
use crate::server::AppState;

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!("Rejected request body: {}", e);
        GatewayError::BadRequest("Malformed JSON body".to_string())
    })
}

/// `GET /api/webhook`: subscription handshake.
pub async fn verify_webhook(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<String, GatewayError> {
    let mode = params.get("hub.mode").map(String::as_str);
    let token = params.get("hub.verify_token").map(String::as_str);
    let challenge = params.get("hub.challenge").map(String::as_str);
    debug!(mode = ?mode, token_present = token.is_some(), "Webhook verification attempt");

    match verify_handshake(mode, token, challenge, state.verify_token.as_ref()) {
        Ok(challenge) => {
            info!("Webhook verified");
            Ok(challenge)
        }
        Err(ChannelError::InvalidRequest(_)) => Err(GatewayError::BadRequest(
            "Missing required parameters".to_string(),
        )),
        Err(ChannelError::Config(e)) => {
            warn!("{}", e);
            Err(GatewayError::NotConfigured(
                "Server configuration error".to_string(),
            ))
        }
        Err(e) => {
            warn!("Webhook verification failed: {}", e);
            Err(GatewayError::Forbidden("Forbidden".to_string()))
        }
    }
}

/// `POST /api/webhook`: provider events.
///
/// Acknowledges every well-formed JSON body; per-entry failures only show up
/// in the logs.
pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let payload: Value = parse_body(&body)?;

    match state.ingestor.ingest_json(payload).await {
        Ok(_) => Ok(Json(json!({ "message": "EVENT_RECEIVED" }))),
        Err(e) => {
            warn!("Webhook payload has unexpected shape: {}", e);
            Ok(Json(json!({
                "message": "EVENT_RECEIVED",
                "processing_error": e.to_string(),
            })))
        }
    }
}

pub async fn method_not_allowed() -> GatewayError {
    GatewayError::MethodNotAllowed
}

/// `POST /api/send-message`.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let request: SendRequest = parse_body(&body)?;
    let result = state.dispatcher.dispatch(request).await?;

    if !result.persisted {
        warn!(contact_id = %result.contact.id, "Message delivered but not persisted");
    }
    Ok(Json(json!({
        "success": true,
        "messageId": result.external_id,
        "data": result.response,
        "persisted": result.persisted,
    })))
}

/// `POST /api/register-outbound-message`.
pub async fn register_outbound(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let request: RegisterRequest = parse_body(&body)?;
    let registered = state.dispatcher.register_outbound(request).await?;

    Ok(Json(json!({
        "success": true,
        "contact_id": registered.contact.id,
        "message_id": registered.message.id,
    })))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Rejects requests without the configured API token.
pub async fn require_api_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    match state.authenticate(&headers) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

/// Fallback for unknown paths.
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
