//! Binary crate for the `weatherdash` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive prompts (dashboard loop, configuration)
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // A `.env` in the working directory; variables already set in the process win.
    match dotenvy::dotenv() {
        Err(e) if !e.not_found() => tracing::warn!("Failed to load .env file: {e}"),
        _ => {}
    }

    let cmd = cli::Cli::parse();
    cmd.run().await
}
