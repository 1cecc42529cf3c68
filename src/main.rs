//! Vorke HD41 HDMI Matrix CLI
//!
//! A command-line interface for controlling the HD41 over its RS232 port.

use anyhow::Result;
use clap::Parser;
use tracing::debug;

use hd41_matrix::Feature;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;

mod config;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?.with_overrides(cli.port.clone(), cli.baud);
    debug!("Config from {}: {:?}", config_path.display(), config);

    match cli.command {
        None => {
            // Default: show everything
            commands::query::status(&config, false).await?;
        }

        // === Query Commands ===
        Some(Commands::Status { json }) => {
            commands::query::status(&config, json).await?;
        }
        Some(Commands::Connected { port }) => {
            commands::query::connected(&config, port.as_deref()).await?;
        }

        // === Query/Set Commands ===
        Some(Commands::Source { input }) => {
            commands::set::source(&config, input).await?;
        }
        Some(Commands::Audio { profile }) => {
            commands::set::audio(&config, profile.as_deref()).await?;
        }
        Some(Commands::Auto { state }) => {
            commands::set::feature(&config, Feature::AutoSwitch, state).await?;
        }
        Some(Commands::Arc { state }) => {
            commands::set::feature(&config, Feature::Arc, state).await?;
        }

        // === Monitoring ===
        Some(Commands::Watch) => {
            commands::watch::watch(&config).await?;
        }

        // === Utility Commands ===
        Some(Commands::Raw { command }) => {
            commands::utility::raw(&config, &command).await?;
        }
        Some(Commands::Commands) => {
            commands::utility::commands()?;
        }
        Some(Commands::List) => {
            commands::utility::list()?;
        }
        Some(Commands::Config { save }) => {
            commands::utility::config(&config, &config_path, save)?;
        }
    }

    Ok(())
}
