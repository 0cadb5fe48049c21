mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use jiron_core::Config;

use commands::{
    chart::handle_chart_command,
    issues::{handle_issues_command, IssuesAction},
    sprint::{handle_sprint_command, SprintAction},
    sync::{handle_sync_command, SyncAction},
};

#[derive(Parser)]
#[command(name = "jiron")]
#[command(about = "Sprint burn-up tracking backed by Jira snapshots", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pull issues or sprints from Jira into the local database
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
    /// Inspect and import sprints
    Sprint {
        #[command(subcommand)]
        action: SprintAction,
    },
    /// Inspect stored issue snapshots
    Issues {
        #[command(subcommand)]
        action: IssuesAction,
    },
    /// Print the story-point chart of a sprint as JSON
    Chart {
        /// Jira sprint id
        sprint: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Sync { action } => handle_sync_command(&config, action).await,
        Commands::Sprint { action } => handle_sprint_command(&config, action).await,
        Commands::Issues { action } => handle_issues_command(&config, action),
        Commands::Chart { sprint } => handle_chart_command(&config, sprint),
    }
}
