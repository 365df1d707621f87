//! CLI routing integration tests.
//!
//! These drive the `wadesk` command tree through its library entry point so
//! top-level routing and argument errors are checked without a built binary.

use clap::Parser;
use tempfile::TempDir;
use wadesk_cli::{run, Cli, Commands};
use wadesk_core::config::Config;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("wadesk").chain(args.iter().copied()))
}

#[tokio::test]
async fn test_cli_version() {
    let cli = parse(&["version"]).unwrap();
    assert!(matches!(cli.command, Commands::Version));
    run(cli).await.unwrap();
}

#[test]
fn test_cli_help_lists_commands() {
    let err = parse(&["--help"]).err().unwrap();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    let help = err.to_string();
    for command in ["serve", "send", "template", "contacts", "stats", "config"] {
        assert!(help.contains(command), "help should mention '{}': {}", command, help);
    }
}

#[test]
fn test_cli_unknown_command() {
    let err = parse(&["nonexistent-command"]).err().unwrap();
    assert_eq!(err.kind(), clap::error::ErrorKind::InvalidSubcommand);
}

#[test]
fn test_cli_send_requires_one_target() {
    assert!(parse(&["send", "Hola"]).is_err());
    assert!(parse(&["send", "--phone", "5511", "--contact-id", "c1", "Hola"]).is_err());
    assert!(parse(&["send", "--phone", "5511", "Hola"]).is_ok());
}

#[tokio::test]
async fn test_cli_config_init_then_validate() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wadesk.json5");
    let path_arg = path.to_str().unwrap();

    run(parse(&["--config", path_arg, "config", "init"]).unwrap())
        .await
        .unwrap();
    assert!(Config::load(&path).is_ok());

    // A second init without --force refuses to overwrite
    assert!(run(parse(&["--config", path_arg, "config", "init"]).unwrap())
        .await
        .is_err());
    run(parse(&["--config", path_arg, "config", "init", "--force"]).unwrap())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cli_config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json5");
    std::fs::write(&path, r#"{ whatsapp: { access_token: "EAAG" } }"#).unwrap();

    let result = run(parse(&["--config", path.to_str().unwrap(), "config", "validate"]).unwrap()).await;
    let err = result.unwrap_err().to_string();
    assert!(err.contains("phone_number_id"), "unexpected error: {}", err);
}
