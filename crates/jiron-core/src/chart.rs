//! Reshape per-status story-point totals into a line-chart payload.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use jiron_storage::{Database, StoryPointAggregate};

use crate::error::Result;

/// `chrono` format of the x-axis labels, e.g. `09:30:00.250 04 Mar 2024`.
///
/// Sync times are stored at millisecond precision, so each stored sync time
/// gets a distinct label.
pub const LABEL_FORMAT: &str = "%H:%M:%S%.3f %d %b %Y";

/// One line of the chart: the story-point totals of a single status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(rename = "borderWidth")]
    pub border_width: u8,
}

/// Chart payload: one label per sync time and one dataset per status
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Build the chart from aggregates ordered by sync time.
///
/// Labels are the distinct sync times in ascending order. Datasets follow the
/// order in which their status first appears. A status missing from a sync
/// contributes no point for it, so its `data` may be shorter than `labels`.
#[must_use]
pub fn build_chart(aggregates: &[StoryPointAggregate]) -> ChartData {
    let labels = aggregates
        .iter()
        .map(|a| a.synced_on)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|t| t.format(LABEL_FORMAT).to_string())
        .collect();

    let mut datasets: Vec<Dataset> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for aggregate in aggregates {
        let slot = *index.entry(aggregate.status.as_str()).or_insert_with(|| {
            datasets.push(Dataset {
                label: aggregate.status.clone(),
                data: Vec::new(),
                border_width: 1,
            });
            datasets.len() - 1
        });
        datasets[slot].data.push(aggregate.total_story_points);
    }

    ChartData { labels, datasets }
}

/// Aggregate the stored snapshots of one sprint and build its chart
///
/// # Errors
///
/// Returns an error if the aggregation query fails
pub fn story_points_chart(database: &Database, sprint_id: Uuid) -> Result<ChartData> {
    let aggregates = database.story_points_by_status_and_sync(sprint_id)?;
    log::debug!(
        "Building chart for sprint {sprint_id} from {} aggregates",
        aggregates.len()
    );
    Ok(build_chart(&aggregates))
}
