//! wadesk CLI entry point.

use clap::Parser;
use wadesk_cli::{init_logging, run, Cli};
use wadesk_core::{env, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    if let Err(e) = env::load_dotenv() {
        eprintln!("Warning: failed to read .env: {}", e);
    }

    // Logging settings come from the config file when it is readable
    let logging = Config::resolve(cli.config.as_deref())
        .map(|c| c.logging)
        .unwrap_or_default();
    init_logging(cli.verbose, &logging);

    // Run the command
    run(cli).await
}
