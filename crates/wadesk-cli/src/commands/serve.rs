//! Serve command.

use clap::Args;
use std::path::Path;
use wadesk_core::config::BindMode;
use wadesk_gateway::Gateway;

use super::{load_config, open_provider, open_store};

/// Serve command arguments.
#[derive(Args)]
pub struct ServeArgs {
    /// Port number (overrides config)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind mode: loopback or lan (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Keep everything in memory instead of the configured database
    #[arg(long)]
    pub memory: bool,
}

pub(crate) fn parse_bind(bind: &str) -> anyhow::Result<BindMode> {
    match bind {
        "loopback" => Ok(BindMode::Loopback),
        "lan" => Ok(BindMode::Lan),
        _ => anyhow::bail!("Invalid bind mode: {} (expected loopback or lan)", bind),
    }
}

/// Run the serve command.
pub async fn run(config_path: Option<&Path>, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind) = args.bind.as_deref() {
        config.server.bind = parse_bind(bind)?;
    }

    let store = open_store(&config, args.memory).await?;
    let provider = open_provider(&config)?;

    Gateway::from_config(&config, store, provider).run().await?;
    Ok(())
}
