//! Helper utility functions for CLI commands

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;

use jiron_core::Config;
use jiron_integrations::{IssueTracker, JiraClient};
use jiron_storage::Database;

/// Open the configured database, creating it on first use
pub fn open_database(config: &Config) -> Result<Arc<Database>> {
    let database = Database::open(config.database.path.clone())
        .context("Failed to open local database")?;
    Ok(Arc::new(database))
}

/// Build an authenticated Jira client from the configuration
pub async fn connect_jira(config: &Config) -> Result<Arc<dyn IssueTracker>> {
    let credentials = config.credentials()?;
    let client = JiraClient::authenticate(credentials)
        .await
        .context("Failed to authenticate with Jira")?
        .with_story_points_field(config.jira.story_points_field.clone())
        .with_page_size(config.jira.page_size);
    Ok(Arc::new(client))
}

/// Short `YYYY-MM-DD` form, or `-` when absent
pub fn format_date(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), |dt| dt.format("%Y-%m-%d").to_string())
}

/// Safely truncate a string to a maximum number of characters (not bytes).
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}
