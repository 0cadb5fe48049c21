/// Chart command handler
use anyhow::Result;

use jiron_core::{story_points_chart, Config};

use super::helpers::open_database;

pub fn handle_chart_command(config: &Config, sprint: i64) -> Result<()> {
    let database = open_database(config)?;
    let sprint = database.get_sprint(sprint)?;

    let chart = story_points_chart(&database, sprint.id)?;
    if chart.labels.is_empty() {
        log::warn!("Sprint {} has no issue snapshots yet", sprint.remote_id);
    }

    println!("{}", serde_json::to_string_pretty(&chart)?);
    Ok(())
}
