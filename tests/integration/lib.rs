//! Shared harness for the integration tests.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use wadesk_channels::{Provider, WhatsAppProvider};
use wadesk_core::Config;
use wadesk_gateway::{create_router, AppState};
use wadesk_store::{SqliteStore, Store};

/// Verify token used by every test app.
pub const VERIFY_TOKEN: &str = "integration-verify";

/// A router over a real SQLite file, optionally talking to a mock provider.
pub struct TestApp {
    pub store: Arc<SqliteStore>,
    pub router: Router,
    _dir: TempDir,
}

impl TestApp {
    /// Build an app; `provider_base` points the WhatsApp client at a mock server.
    pub async fn new(mut config: Config, provider_base: Option<&str>) -> Self {
        let dir = TempDir::new().unwrap();
        config.store.database_url = format!("sqlite://{}", dir.path().join("wadesk.db").display());
        config.whatsapp.verify_token = Some(VERIFY_TOKEN.into());

        let store = Arc::new(SqliteStore::connect(&config.store.database_url).await.unwrap());

        let provider: Option<Arc<dyn Provider>> = provider_base.map(|base| {
            config.whatsapp.access_token = Some("integration-token".into());
            config.whatsapp.phone_number_id = Some("100200300".into());
            let provider = WhatsAppProvider::from_config(&config.whatsapp)
                .unwrap()
                .with_base_url(base);
            Arc::new(provider) as Arc<dyn Provider>
        });

        let state = AppState::build(&config, store.clone() as Arc<dyn Store>, provider);
        Self {
            store,
            router: create_router(Arc::new(state)),
            _dir: dir,
        }
    }

    /// Send a request and decode the JSON response.
    pub async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.call(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }
}

/// A webhook body carrying one text message.
pub fn text_message(from: &str, id: &str, body: &str) -> Value {
    json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "WABA_ID",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": { "display_phone_number": "15550001111", "phone_number_id": "100200300" },
                    "contacts": [{ "wa_id": from, "profile": { "name": "Cliente" } }],
                    "messages": [{
                        "from": from,
                        "id": id,
                        "timestamp": "1700000000",
                        "type": "text",
                        "text": { "body": body }
                    }]
                }
            }]
        }]
    })
}

/// A webhook body carrying one delivery status.
pub fn status_update(recipient: &str, status: &str) -> Value {
    json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "WABA_ID",
            "changes": [{
                "field": "messages",
                "value": {
                    "statuses": [{
                        "id": "wamid.STATUS",
                        "status": status,
                        "timestamp": "1700000001",
                        "recipient_id": recipient
                    }]
                }
            }]
        }]
    })
}
