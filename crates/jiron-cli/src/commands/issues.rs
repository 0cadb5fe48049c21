/// Issue snapshot command handlers
use anyhow::Result;
use clap::Subcommand;
use tabled::{Table, Tabled};

use jiron_core::Config;
use jiron_storage::Issue;

use super::helpers::{open_database, truncate_str};

#[derive(Subcommand, Debug)]
pub enum IssuesAction {
    /// List stored issue snapshots, oldest sync first
    List {
        /// Only show snapshots of this Jira sprint
        #[arg(short, long)]
        sprint: Option<i64>,
    },
}

#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Points")]
    story_points: f64,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Synced")]
    synced_on: String,
}

impl From<&Issue> for IssueRow {
    fn from(issue: &Issue) -> Self {
        Self {
            key: issue.key.clone(),
            summary: truncate_str(&issue.summary, 50),
            status: issue.status.clone(),
            story_points: issue.story_points,
            assignee: issue.assignee.name.clone(),
            synced_on: issue.synced_on.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

pub fn handle_issues_command(config: &Config, action: IssuesAction) -> Result<()> {
    let database = open_database(config)?;

    match action {
        IssuesAction::List { sprint } => {
            let issues = match sprint {
                Some(remote_id) => {
                    let sprint = database.get_sprint(remote_id)?;
                    database.list_issues_for_sprint(sprint.id)?
                }
                None => database.list_issues()?,
            };

            if issues.is_empty() {
                println!("No issue snapshots stored.");
                return Ok(());
            }

            let rows: Vec<IssueRow> = issues.iter().map(IssueRow::from).collect();
            println!("{}", Table::new(rows));
            println!("\n{} snapshots", issues.len());
        }
    }

    Ok(())
}
