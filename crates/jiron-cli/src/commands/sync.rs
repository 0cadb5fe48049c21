/// Sync command handlers - pull issue snapshots and sprints from Jira
use anyhow::Result;
use clap::Subcommand;
use std::sync::Arc;

use jiron_core::{Config, SyncReport, SyncService, SyncTarget};

use super::helpers::{connect_jira, open_database};

#[derive(Subcommand, Debug)]
pub enum SyncAction {
    /// Store one snapshot of every issue in a sprint
    Issues {
        /// Jira sprint id (the sprint must be synced or imported first)
        #[arg(short, long)]
        sprint: i64,
    },
    /// Upsert every sprint on the configured board
    Sprints,
}

pub async fn handle_sync_command(config: &Config, action: SyncAction) -> Result<()> {
    let database = open_database(config)?;
    let service = Arc::new(SyncService::new(database, SyncTarget::from(config)));
    let tracker = connect_jira(config).await?;

    let report = match action {
        SyncAction::Issues { sprint } => {
            println!("Syncing issues of sprint {sprint}...");
            service.spawn_issue_sync(tracker, sprint).await??
        }
        SyncAction::Sprints => {
            println!(
                "Syncing sprints on board {} ({})...",
                config.jira.board_id,
                config.sync.sprint_states.join(", ")
            );
            service.spawn_sprint_sync(tracker).await??
        }
    };

    print_report(&report);
    Ok(())
}

fn print_report(report: &SyncReport) {
    println!("\nSync complete: {report}");

    if !report.errors.is_empty() {
        println!("\nWarnings:");
        for err in &report.errors {
            println!("  - {err}");
        }
    }
}
