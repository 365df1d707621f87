//! HTTP gateway server.

use crate::dispatch::Dispatcher;
use crate::error::GatewayError;
use crate::handlers;
use crate::ingest::WebhookIngestor;
use crate::recorder::MessageRecorder;
use crate::resolver::ContactResolver;
use crate::Result;
use axum::{
    http::{header, HeaderMap, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use wadesk_channels::Provider;
use wadesk_core::config::{BindMode, Config};
use wadesk_core::SecretString;
use wadesk_store::Store;

/// Default gateway port.
pub const DEFAULT_PORT: u16 = 8080;

/// Listener settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Bind mode.
    pub bind: BindMode,

    /// Port number.
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: BindMode::Loopback,
            port: DEFAULT_PORT,
        }
    }
}

/// Shared request state.
pub struct AppState {
    pub ingestor: WebhookIngestor,
    pub dispatcher: Dispatcher,

    /// Token the provider must present during the webhook handshake.
    pub verify_token: Option<SecretString>,

    /// Bearer token for the send routes. Unset means open.
    pub api_token: Option<SecretString>,
}

impl AppState {
    /// Wire the services on top of a store and an optional provider.
    pub fn build(
        config: &Config,
        store: Arc<dyn Store>,
        provider: Option<Arc<dyn Provider>>,
    ) -> Self {
        let resolver = ContactResolver::new(store.clone());
        let recorder = MessageRecorder::new(store, config.webhook.duplicate_policy);
        let ingestor = WebhookIngestor::new(resolver.clone(), recorder.clone())
            .with_profile_names(config.webhook.use_profile_names);
        let dispatcher = Dispatcher::new(resolver, recorder, provider)
            .with_template_language(config.whatsapp.template_language.clone());

        Self {
            ingestor,
            dispatcher,
            verify_token: config.whatsapp.verify_token.clone(),
            api_token: config.server.api_token.clone(),
        }
    }

    /// Check the bearer token against the configured API token.
    pub(crate) fn authenticate(&self, headers: &HeaderMap) -> std::result::Result<(), GatewayError> {
        let Some(expected) = self.api_token.as_ref().filter(|t| !t.is_empty()) else {
            return Ok(());
        };

        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        match provided {
            Some(token) if expected.matches(token) => Ok(()),
            Some(_) => Err(GatewayError::Unauthorized("Invalid API token".to_string())),
            None => Err(GatewayError::Unauthorized("Missing API token".to_string())),
        }
    }
}

/// The HTTP gateway.
pub struct Gateway {
    config: GatewayConfig,
    state: Arc<AppState>,
}

impl Gateway {
    pub fn new(config: GatewayConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Build the gateway and its services from application config.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn Store>,
        provider: Option<Arc<dyn Provider>>,
    ) -> Self {
        let gateway_config = GatewayConfig {
            bind: config.server.bind,
            port: config.server.port,
        };
        Self::new(gateway_config, AppState::build(config, store, provider))
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Run the gateway server until ctrl-c.
    pub async fn run(&self) -> Result<()> {
        let addr = self.bind_address();

        if self.config.bind != BindMode::Loopback {
            warn!("Gateway binding to {}; it is reachable from the network", addr);
            if self.state.api_token.is_none() {
                warn!("No API token configured; /api/send-message is open to anyone who can reach it");
            }
        }
        if self.state.verify_token.is_none() {
            warn!("No webhook verify token configured; handshakes will fail");
        }
        if !self.state.dispatcher.can_send() {
            warn!("WhatsApp credentials missing; sending is disabled");
        }

        let app = self.router();

        info!("Starting gateway server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        info!("Gateway stopped");
        Ok(())
    }

    /// Create the Axum router.
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Get the bind address.
    pub fn bind_address(&self) -> SocketAddr {
        let ip = match self.config.bind {
            BindMode::Loopback => [127, 0, 0, 1],
            BindMode::Lan => [0, 0, 0, 0],
        };

        SocketAddr::from((ip, self.config.port))
    }
}

/// Build the router over shared state.
pub fn create_router(state: Arc<AppState>) -> Router {
    let webhook = Router::new()
        .route(
            "/api/webhook",
            get(handlers::verify_webhook)
                .post(handlers::receive_webhook)
                .put(handlers::method_not_allowed)
                .delete(handlers::method_not_allowed)
                .patch(handlers::method_not_allowed),
        )
        .layer(webhook_cors_layer());

    let api = Router::new()
        .route("/api/send-message", post(handlers::send_message))
        .route(
            "/api/register-outbound-message",
            post(handlers::register_outbound),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_api_token,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(webhook)
        .merge(api)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The provider calls the webhook from its own origin.
fn webhook_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
