//! Send and template commands.

use anyhow::Context;
use clap::Args;
use std::path::Path;
use wadesk_core::Config;
use wadesk_gateway::{AppState, SendRequest};

use super::{load_config, open_provider, open_store};

/// Send command arguments.
#[derive(Args)]
#[command(group(clap::ArgGroup::new("target").required(true).args(["contact_id", "phone"])))]
pub struct SendArgs {
    /// Existing contact id
    #[arg(long)]
    pub contact_id: Option<String>,

    /// Phone number; the contact is created if unknown
    #[arg(long)]
    pub phone: Option<String>,

    /// Message text
    pub message: String,
}

/// Template command arguments.
#[derive(Args)]
pub struct TemplateArgs {
    /// Recipient phone number
    #[arg(long)]
    pub phone: String,

    /// Template name
    pub name: String,

    /// Positional body parameters
    pub params: Vec<String>,
}

async fn services(config: &Config) -> anyhow::Result<AppState> {
    let provider = open_provider(config)?
        .context("WhatsApp is not configured: set WHATSAPP_ACCESS_TOKEN and WHATSAPP_PHONE_NUMBER_ID")?;
    let store = open_store(config, false).await?;
    Ok(AppState::build(config, store, Some(provider)))
}

/// Run the send command.
pub async fn run_send(config_path: Option<&Path>, args: SendArgs) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let state = services(&config).await?;

    let request = SendRequest {
        contact_id: args.contact_id,
        phone: args.phone,
        message: args.message,
    };
    let result = state.dispatcher.dispatch(request).await?;

    println!(
        "Sent to {} ({})",
        result.contact.name, result.contact.phone
    );
    println!(
        "  WhatsApp id: {}",
        result.external_id.as_deref().unwrap_or("-")
    );
    if !result.persisted {
        eprintln!("Warning: the message was delivered but could not be stored");
    }
    Ok(())
}

/// Run the template command.
pub async fn run_template(config_path: Option<&Path>, args: TemplateArgs) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let state = services(&config).await?;

    let response = state
        .dispatcher
        .send_template(&args.phone, &args.name, &args.params)
        .await?;

    println!(
        "Template '{}' sent to {} (WhatsApp id: {})",
        args.name,
        args.phone,
        response.message_id.as_deref().unwrap_or("-")
    );
    Ok(())
}
