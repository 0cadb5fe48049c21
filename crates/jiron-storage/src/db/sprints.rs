use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};
use std::sync::MutexGuard;
use uuid::Uuid;

use super::helpers::{format_timestamp, get_optional_timestamp, parse_uuid};
use super::Database;
use crate::error::{Result, StoreError};
use crate::models::Sprint;

const SPRINT_COLUMNS: &str = "id, remote_id, name, state, start_date, end_date";

impl Database {
    /// Insert a new sprint
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] if a sprint with the same remote id
    /// exists, or an error if the insert fails
    pub fn create_sprint(&self, sprint: &Sprint) -> Result<Sprint> {
        create(&self.conn(), sprint)
    }

    /// Insert a sprint, or refresh name/state/dates of the row with the same
    /// remote id. The local id of an existing row is preserved.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub fn upsert_sprint(&self, sprint: &Sprint) -> Result<Sprint> {
        upsert(&self.conn(), sprint)
    }

    /// Get a sprint by its remote id
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no sprint has this remote id
    pub fn get_sprint(&self, remote_id: i64) -> Result<Sprint> {
        self.conn()
            .query_row(
                &format!("SELECT {SPRINT_COLUMNS} FROM sprints WHERE remote_id = ?1"),
                params![remote_id],
                row_to_sprint,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("sprint {remote_id}")))
    }

    /// Get a sprint by its local id
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no sprint has this id
    pub fn get_sprint_by_id(&self, id: Uuid) -> Result<Sprint> {
        self.conn()
            .query_row(
                &format!("SELECT {SPRINT_COLUMNS} FROM sprints WHERE id = ?1"),
                params![id.to_string()],
                row_to_sprint,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("sprint {id}")))
    }

    /// List sprints, optionally restricted to the given states. An empty
    /// filter returns every sprint.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub fn list_sprints(&self, states: &[String]) -> Result<Vec<Sprint>> {
        let conn = self.conn();

        let sql = if states.is_empty() {
            format!("SELECT {SPRINT_COLUMNS} FROM sprints ORDER BY remote_id")
        } else {
            let placeholders = (1..=states.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "SELECT {SPRINT_COLUMNS} FROM sprints WHERE state IN ({placeholders}) ORDER BY remote_id"
            )
        };

        let mut stmt = conn.prepare(&sql)?;
        let sprints = stmt
            .query_map(params_from_iter(states.iter()), row_to_sprint)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sprints)
    }

    /// Start a sprint batch transaction.
    ///
    /// The returned guard holds the connection until it is committed, rolled
    /// back or dropped; other calls on this `Database` block meanwhile.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started
    pub fn begin(&self) -> Result<SprintTransaction<'_>> {
        let conn = self.conn();
        conn.execute_batch("BEGIN IMMEDIATE")?;
        log::debug!("Sprint transaction started");
        Ok(SprintTransaction {
            conn,
            finished: false,
        })
    }
}

/// Explicit, caller-managed transaction over the sprint table.
///
/// Dropping it without calling [`commit`](Self::commit) rolls back.
pub struct SprintTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl SprintTransaction<'_> {
    /// Upsert a sprint inside the transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub fn upsert(&self, sprint: &Sprint) -> Result<Sprint> {
        upsert(&self.conn, sprint)
    }

    /// Create a sprint inside the transaction
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] if the remote id already exists
    pub fn create(&self, sprint: &Sprint) -> Result<Sprint> {
        create(&self.conn, sprint)
    }

    /// Commit every write made through this transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails; the transaction is then rolled back
    pub fn commit(mut self) -> Result<()> {
        self.finish("COMMIT")?;
        log::debug!("Sprint transaction committed");
        Ok(())
    }

    /// Discard every write made through this transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails; dropping the guard then retries it
    pub fn rollback(mut self) -> Result<()> {
        self.finish("ROLLBACK")?;
        log::debug!("Sprint transaction rolled back");
        Ok(())
    }

    /// Run the closing statement; the transaction only counts as finished once
    /// it succeeds
    fn finish(&mut self, statement: &str) -> Result<()> {
        self.conn.execute_batch(statement)?;
        self.finished = true;
        Ok(())
    }
}

impl Drop for SprintTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                log::warn!("Failed to roll back abandoned sprint transaction: {e}");
            }
        }
    }
}

fn create(conn: &Connection, sprint: &Sprint) -> Result<Sprint> {
    let result = conn.execute(
        "INSERT INTO sprints (id, remote_id, name, state, start_date, end_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            sprint.id.to_string(),
            sprint.remote_id,
            sprint.name,
            sprint.state,
            sprint.start_date.as_ref().map(format_timestamp),
            sprint.end_date.as_ref().map(format_timestamp),
        ],
    );

    match result {
        Ok(_) => Ok(sprint.clone()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Err(StoreError::DuplicateKey {
                remote_id: sprint.remote_id,
            })
        }
        Err(e) => Err(e.into()),
    }
}

/// Single-statement upsert keyed on `remote_id`; no separate existence check
fn upsert(conn: &Connection, sprint: &Sprint) -> Result<Sprint> {
    let id: String = conn.query_row(
        "INSERT INTO sprints (id, remote_id, name, state, start_date, end_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(remote_id) DO UPDATE SET
            name = excluded.name,
            state = excluded.state,
            start_date = excluded.start_date,
            end_date = excluded.end_date
         RETURNING id",
        params![
            sprint.id.to_string(),
            sprint.remote_id,
            sprint.name,
            sprint.state,
            sprint.start_date.as_ref().map(format_timestamp),
            sprint.end_date.as_ref().map(format_timestamp),
        ],
        |row| row.get(0),
    )?;

    Ok(Sprint {
        id: parse_uuid(0, &id)?,
        ..sprint.clone()
    })
}

/// Helper function to parse `Sprint` from database row
fn row_to_sprint(row: &rusqlite::Row) -> rusqlite::Result<Sprint> {
    Ok(Sprint {
        id: parse_uuid(0, &row.get::<_, String>(0)?)?,
        remote_id: row.get(1)?,
        name: row.get(2)?,
        state: row.get(3)?,
        start_date: get_optional_timestamp(row, 4)?,
        end_date: get_optional_timestamp(row, 5)?,
    })
}
