use rusqlite::params;
use uuid::Uuid;

use super::helpers::{format_timestamp, get_optional_timestamp, parse_timestamp, parse_uuid};
use super::Database;
use crate::error::Result;
use crate::models::{Assignee, Issue, StoryPointAggregate};

const ISSUE_COLUMNS: &str = "key, summary, status, story_points, created_at, \
                             assignee_name, assignee_email, synced_on, sprint_id";

impl Database {
    /// Insert an issue snapshot under a freshly generated id.
    ///
    /// Snapshots are never updated; saving the same issue twice stores two rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert operation fails
    pub fn save_issue(&self, issue: &Issue) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.conn().execute(
            "INSERT INTO issues (id, key, summary, status, story_points, created_at,
                                 assignee_name, assignee_email, synced_on, sprint_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                id.to_string(),
                issue.key,
                issue.summary,
                issue.status,
                issue.story_points,
                issue.created_at.as_ref().map(format_timestamp),
                issue.assignee.name,
                issue.assignee.email,
                format_timestamp(&issue.synced_on),
                issue.sprint_id.to_string(),
            ],
        )?;
        Ok(id)
    }

    /// Get every stored issue snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn list_issues(&self) -> Result<Vec<Issue>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues ORDER BY synced_on, key"
        ))?;

        let issues = stmt
            .query_map([], row_to_issue)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(issues)
    }

    /// Get the issue snapshots recorded for one sprint
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn list_issues_for_sprint(&self, sprint_id: Uuid) -> Result<Vec<Issue>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE sprint_id = ?1 ORDER BY synced_on, key"
        ))?;

        let issues = stmt
            .query_map(params![sprint_id.to_string()], row_to_issue)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(issues)
    }

    /// Sum story points per (status, sync time) for one sprint, oldest sync first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn story_points_by_status_and_sync(
        &self,
        sprint_id: Uuid,
    ) -> Result<Vec<StoryPointAggregate>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT status, synced_on, SUM(story_points) AS total_story_points
             FROM issues
             WHERE sprint_id = ?1
             GROUP BY status, synced_on
             ORDER BY synced_on ASC, status ASC",
        )?;

        let aggregates = stmt
            .query_map(params![sprint_id.to_string()], |row| {
                Ok(StoryPointAggregate {
                    status: row.get(0)?,
                    synced_on: parse_timestamp(1, &row.get::<_, String>(1)?)?,
                    total_story_points: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(aggregates)
    }
}

/// Helper function to parse `Issue` from database row
fn row_to_issue(row: &rusqlite::Row) -> rusqlite::Result<Issue> {
    Ok(Issue {
        key: row.get(0)?,
        summary: row.get(1)?,
        status: row.get(2)?,
        story_points: row.get(3)?,
        created_at: get_optional_timestamp(row, 4)?,
        assignee: Assignee {
            name: row.get(5)?,
            email: row.get(6)?,
        },
        synced_on: parse_timestamp(7, &row.get::<_, String>(7)?)?,
        sprint_id: parse_uuid(8, &row.get::<_, String>(8)?)?,
    })
}
