/// Sprint command handlers
use anyhow::Result;
use clap::Subcommand;
use tabled::{Table, Tabled};

use jiron_core::{Config, SyncService, SyncTarget};
use jiron_storage::Sprint;

use super::helpers::{connect_jira, format_date, open_database, truncate_str};

#[derive(Subcommand, Debug)]
pub enum SprintAction {
    /// List stored sprints
    List {
        /// Only show sprints in these states (repeatable)
        #[arg(short, long = "state")]
        states: Vec<String>,
    },
    /// Show one stored sprint and its snapshot count
    Show {
        /// Jira sprint id
        sprint: i64,
    },
    /// Fetch a single sprint from Jira and store it
    Import {
        /// Jira sprint id
        sprint: i64,
    },
}

#[derive(Tabled)]
struct SprintRow {
    #[tabled(rename = "Jira ID")]
    remote_id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
}

impl From<&Sprint> for SprintRow {
    fn from(sprint: &Sprint) -> Self {
        Self {
            remote_id: sprint.remote_id,
            name: truncate_str(&sprint.name, 40),
            state: sprint.state.clone(),
            start: format_date(sprint.start_date),
            end: format_date(sprint.end_date),
        }
    }
}

pub async fn handle_sprint_command(config: &Config, action: SprintAction) -> Result<()> {
    let database = open_database(config)?;

    match action {
        SprintAction::List { states } => {
            let sprints = database.list_sprints(&states)?;
            if sprints.is_empty() {
                println!("No sprints stored. Run: jiron sync sprints");
                return Ok(());
            }

            let rows: Vec<SprintRow> = sprints.iter().map(SprintRow::from).collect();
            println!("{}", Table::new(rows));
        }
        SprintAction::Show { sprint } => {
            let sprint = database.get_sprint(sprint)?;
            let snapshots = database.list_issues_for_sprint(sprint.id)?;

            println!("{}", Table::new([SprintRow::from(&sprint)]));
            println!("\nLocal id: {}", sprint.id);
            println!("Issue snapshots: {}", snapshots.len());
        }
        SprintAction::Import { sprint } => {
            let tracker = connect_jira(config).await?;
            let service = SyncService::new(database, SyncTarget::from(config));
            let imported = service.import_sprint(tracker.as_ref(), sprint).await?;
            println!("Imported sprint {} ({})", imported.remote_id, imported.name);
        }
    }

    Ok(())
}
