//! wadesk command-line interface.

pub mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wadesk_core::config::LoggingConfig;
use wadesk_core::env::{self, vars};

/// wadesk - WhatsApp Business webhook and contact desk
#[derive(Parser)]
#[command(name = "wadesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "WADESK_CONFIG", global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the webhook and API server
    Serve(commands::serve::ServeArgs),

    /// Send a text message
    Send(commands::send::SendArgs),

    /// Send an approved template message
    Template(commands::send::TemplateArgs),

    /// List and update contacts
    Contacts(commands::contacts::ContactsArgs),

    /// Show dashboard statistics
    Stats,

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::serve::run(config_path, args).await,
        Commands::Send(args) => commands::send::run_send(config_path, args).await,
        Commands::Template(args) => commands::send::run_template(config_path, args).await,
        Commands::Contacts(args) => commands::contacts::run(config_path, args).await,
        Commands::Stats => commands::stats::run(config_path).await,
        Commands::Config(args) => commands::config::run(config_path, args).await,
        Commands::Version => {
            println!("wadesk {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Filter directive used when neither `RUST_LOG` nor `WADESK_LOG` is set.
pub fn default_filter(verbose: u8, level: &str) -> String {
    match verbose {
        0 => format!("wadesk={},tower_http=warn", level),
        1 => "wadesk=debug,tower_http=debug".to_string(),
        _ => "wadesk=trace,tower_http=trace,sqlx=debug".to_string(),
    }
}

/// Install the global tracing subscriber.
pub fn init_logging(verbose: u8, config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| env::get_var(vars::WADESK_LOG).and_then(|d| EnvFilter::try_new(d).ok()))
        .unwrap_or_else(|| EnvFilter::new(default_filter(verbose, &config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_version() {
        let cli = Cli::try_parse_from(["wadesk", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["wadesk", "serve", "--port", "9090", "--bind", "lan", "--memory"])
            .unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(9090));
                assert_eq!(args.bind.as_deref(), Some("lan"));
                assert!(args.memory);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_parse_send_requires_one_target() {
        let cli = Cli::try_parse_from(["wadesk", "send", "--phone", "5511", "Hola"]).unwrap();
        match cli.command {
            Commands::Send(args) => {
                assert_eq!(args.phone.as_deref(), Some("5511"));
                assert!(args.contact_id.is_none());
                assert_eq!(args.message, "Hola");
            }
            _ => panic!("Expected Send command"),
        }

        assert!(Cli::try_parse_from(["wadesk", "send", "Hola"]).is_err());
        assert!(Cli::try_parse_from([
            "wadesk", "send", "--phone", "5511", "--contact-id", "c1", "Hola"
        ])
        .is_err());
    }

    #[test]
    fn test_parse_template() {
        let cli = Cli::try_parse_from([
            "wadesk", "template", "--phone", "5511", "bienvenida", "Ana", "lunes",
        ])
        .unwrap();
        match cli.command {
            Commands::Template(args) => {
                assert_eq!(args.name, "bienvenida");
                assert_eq!(args.params, vec!["Ana", "lunes"]);
            }
            _ => panic!("Expected Template command"),
        }
    }

    #[test]
    fn test_parse_contacts() {
        let cli = Cli::try_parse_from([
            "wadesk", "contacts", "list", "--status", "inscrito", "--search", "ana",
        ])
        .unwrap();
        match cli.command {
            Commands::Contacts(args) => match args.command {
                commands::contacts::ContactsCommand::List { status, search } => {
                    assert_eq!(status.as_deref(), Some("inscrito"));
                    assert_eq!(search.as_deref(), Some("ana"));
                }
                _ => panic!("Expected Contacts List command"),
            },
            _ => panic!("Expected Contacts command"),
        }

        let cli =
            Cli::try_parse_from(["wadesk", "contacts", "set-status", "c1", "rechazado"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Contacts(commands::contacts::ContactsArgs {
                command: commands::contacts::ContactsCommand::SetStatus { .. }
            })
        ));
    }

    #[test]
    fn test_parse_config_init_force() {
        let cli = Cli::try_parse_from(["wadesk", "config", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Config(args) => {
                assert!(matches!(
                    args.command,
                    commands::config::ConfigCommand::Init { force: true }
                ));
            }
            _ => panic!("Expected Config command"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["wadesk", "stats", "--config", "/tmp/w.json5"]).unwrap();
        assert_eq!(cli.config.unwrap().to_str(), Some("/tmp/w.json5"));
    }

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(0, "info"), "wadesk=info,tower_http=warn");
        assert!(default_filter(1, "info").starts_with("wadesk=debug"));
    }
}
