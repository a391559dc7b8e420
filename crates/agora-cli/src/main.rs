//! Agora command-line interface
//!
//! Runs feed, item and story operations against a JSON dataset and prints
//! the result as JSON on stdout.

use agora_cli::{Cli, CliContext, CliHandler};
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let context = CliContext::load(&cli.config, &cli.data, cli.now_ms).await?;

    // RUST_LOG wins over --verbose, which wins over the config file.
    let default_level = if cli.verbose {
        "debug"
    } else {
        context.config.logging.level.as_str()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let handler = CliHandler::new(context);
    let output = handler.handle(&cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
