//! TaskBridge CLI - Command-line interface for TaskBridge
//!
//! Provides commands for:
//! - Provisioning API credentials
//! - Running one reconciliation pass
//! - Pushing a single item
//! - Inspecting mappings and pending completion divergences
//! - Viewing and validating configuration

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod wiring;

use commands::{
    auth::AuthCommand, completions::CompletionsCommand, config::ConfigCommand,
    divergences::DivergencesCommand, mappings::MappingsCommand, push::PushCommand,
    sync::SyncCommand,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "taskbridge",
    version,
    about = "Bidirectional reminder/task reconciliation"
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
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage API credentials
    #[command(subcommand)]
    Auth(AuthCommand),
    /// Run one reconciliation pass
    Sync(SyncCommand),
    /// Push a single item to the remote store
    Push(PushCommand),
    /// List persisted mapping records
    Mappings(MappingsCommand),
    /// Show pending completion divergences
    Divergences(DivergencesCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Auth(cmd) => cmd.execute(config, format).await,
        Commands::Sync(cmd) => cmd.execute(config, format).await,
        Commands::Push(cmd) => cmd.execute(config, format).await,
        Commands::Mappings(cmd) => cmd.execute(config, format).await,
        Commands::Divergences(cmd) => cmd.execute(config, format).await,
        Commands::Config(cmd) => cmd.execute(config, format).await,
        Commands::Completions(cmd) => cmd.execute(format).await,
    }
}
