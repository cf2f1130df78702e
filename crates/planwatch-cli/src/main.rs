//! planwatch CLI application
//!
//! Read-only terminal view of a plan tracker, kept live over a WebSocket or
//! server-sent events.

mod args;
mod cli;
mod renderer;

use anyhow::Result;
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use planwatch_core::SyncConfig;
use renderer::TerminalRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        base_url,
        transport,
        status,
        max_reconnect_attempts,
        no_color,
        command,
    } = Args::parse();

    let mut config = SyncConfig {
        base_url,
        transport,
        status_filter: status,
        ..SyncConfig::default()
    };
    if let Some(attempts) = max_reconnect_attempts {
        config.max_reconnect_attempts = attempts;
    }

    info!("planwatch started for {} over {}", config.base_url, config.transport);
    let cli = Cli::new(config, TerminalRenderer::new(!no_color));

    match command.unwrap_or(Commands::Watch) {
        Commands::Watch => cli.watch().await,
        Commands::Snapshot => cli.snapshot().await,
    }
}
