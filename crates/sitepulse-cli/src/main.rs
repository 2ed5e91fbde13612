//! SitePulse CLI - Command-line interface for SitePulse
//!
//! Provides commands for:
//! - Replaying recorded host event streams through a page session
//! - Listing, viewing and deleting user study exports
//! - Viewing and editing configuration
//! - Generating shell completions

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sitepulse_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    completions::CompletionsCommand, config::ConfigCommand, exports::ExportsCommand,
    replay::ReplayCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "sitepulse",
    version,
    about = "Event telemetry aggregator for marketing pages"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a JSON-lines host event stream through a page session
    Replay(ReplayCommand),
    /// Manage user study exports
    #[command(subcommand)]
    Exports(ExportsCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    // Setup tracing: -v flags win over the configured level, RUST_LOG over both
    let filter = match cli.verbose {
        0 => Config::load_or_default(&config_path).logging.level,
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Replay(cmd) => cmd.execute(format, &config_path).await,
        Commands::Exports(cmd) => cmd.execute(format, &config_path).await,
        Commands::Config(cmd) => cmd.execute(format, &config_path).await,
        Commands::Completions(cmd) => cmd.execute(format).await,
    }
}
