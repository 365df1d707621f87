//! Configuration management commands.

use anyhow::Context;
use clap::Args;
use serde_json::Value;
use std::path::{Path, PathBuf};
use wadesk_core::config::Config;
use wadesk_core::paths;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration, secrets redacted
    Show,

    /// Validate configuration
    Validate,

    /// Write a default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

const SECRET_FIELDS: &[(&str, &str)] = &[
    ("server", "api_token"),
    ("whatsapp", "access_token"),
    ("whatsapp", "verify_token"),
];

/// Serialize the config with secret values masked.
pub(crate) fn redacted(config: &Config) -> anyhow::Result<Value> {
    let mut json = serde_json::to_value(config)?;
    for (section, field) in SECRET_FIELDS {
        if let Some(value) = json.get_mut(*section).and_then(|s| s.get_mut(*field)) {
            *value = Value::String("********".to_string());
        }
    }
    Ok(json)
}

/// Write a default config to `path`, refusing to overwrite unless forced.
pub(crate) fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }
    Config::default().save(path)?;
    Ok(())
}

/// Run the config command.
pub async fn run(config_path: Option<&Path>, args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::resolve(config_path).context("Failed to load configuration")?;
            println!("{}", serde_json::to_string_pretty(&redacted(&config)?)?);
        }

        ConfigCommand::Validate => {
            let config = Config::resolve(config_path).context("Failed to load configuration")?;
            match config.validate() {
                Ok(()) => println!("Configuration is valid"),
                Err(e) => anyhow::bail!("Configuration error: {}", e),
            }
        }

        ConfigCommand::Init { force } => {
            let path: PathBuf = match config_path {
                Some(path) => path.to_path_buf(),
                None => paths::config_file()?,
            };
            init(&path, force)?;
            println!("Created config file: {}", path.display());
        }
    }

    Ok(())
}
