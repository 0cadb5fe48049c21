use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Assignee of an issue, embedded in the issue row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub name: String,
    pub email: String,
}

/// Issue snapshot - the state of one remote issue as seen by one sync cycle.
///
/// Rows are append-only: the same `key` appears once per sync cycle it was
/// fetched in, which is what the burn-up aggregation is built on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String, // remote key, e.g. "STIP-42"
    pub summary: String,
    pub status: String,
    pub story_points: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub assignee: Assignee,
    pub synced_on: DateTime<Utc>,
    pub sprint_id: Uuid, // local id of the owning sprint
}

/// Sprint record, one row per remote sprint id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: Uuid,
    pub remote_id: i64,
    pub name: String,
    pub state: String, // "active", "closed", "future", ...
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Sprint {
    #[must_use]
    pub fn new(remote_id: i64, name: String, state: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            remote_id,
            name,
            state,
            start_date: None,
            end_date: None,
        }
    }

    #[must_use]
    pub fn with_dates(
        mut self,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }
}

/// Story points summed per (status, sync time) for one sprint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryPointAggregate {
    pub status: String,
    pub synced_on: DateTime<Utc>,
    pub total_story_points: f64,
}
