//! CLI command implementations.

pub mod config;
pub mod contacts;
pub mod send;
pub mod serve;
pub mod stats;

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use wadesk_channels::{Provider, WhatsAppProvider};
use wadesk_core::Config;
use wadesk_store::{MemoryStore, SqliteStore, Store};

/// Load and validate the effective configuration.
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::resolve(path).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Open the configured store, or an empty in-memory one.
pub(crate) async fn open_store(config: &Config, memory: bool) -> anyhow::Result<Arc<dyn Store>> {
    if memory {
        info!("Using in-memory store; data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = SqliteStore::connect(&config.store.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.store.database_url))?;
    Ok(Arc::new(store))
}

/// The WhatsApp provider, when credentials are configured.
pub(crate) fn open_provider(config: &Config) -> anyhow::Result<Option<Arc<dyn Provider>>> {
    if !config.whatsapp.can_send() {
        return Ok(None);
    }
    let provider = WhatsAppProvider::from_config(&config.whatsapp)?;
    Ok(Some(Arc::new(provider)))
}
