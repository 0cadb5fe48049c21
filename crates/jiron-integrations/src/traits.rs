use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Person an issue is assigned to. Both parts are blank when unassigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub name: String,
    pub email: String,
}

/// Issue as reported by the tracker at one point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteIssue {
    pub key: String, // e.g. "STIP-42"
    pub summary: String,
    pub status: String,
    pub story_points: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub assignee: Assignee,
    /// Shared by every issue returned from the same fetch call
    pub synced_on: DateTime<Utc>,
}

/// Sprint metadata fetched from the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSprint {
    pub id: i64,
    pub name: String,
    pub state: String, // "active", "closed", "future", ...
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Read-only view of a project tracker with sprints
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Fetch every issue of `project_key` in the given sprint, following all pages.
    ///
    /// All returned issues carry the same `synced_on` timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails; no partial result is returned
    async fn fetch_sprint_issues(&self, project_key: &str, sprint_id: i64)
        -> Result<Vec<RemoteIssue>>;

    /// Fetch the sprints of a board whose state is one of `states`
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails
    async fn fetch_sprints_on_board(
        &self,
        board_id: i64,
        states: &[String],
    ) -> Result<Vec<RemoteSprint>>;

    /// Fetch a single sprint by its tracker id
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the sprint does not exist
    async fn fetch_sprint(&self, sprint_id: i64) -> Result<RemoteSprint>;

    /// Get the system name
    #[must_use]
    fn system_name(&self) -> &'static str;
}
