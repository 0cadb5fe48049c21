use rusqlite::Connection;

use crate::error::Result;

/// Initialize database schema
///
/// # Errors
///
/// Returns an error if database table creation or index creation fails
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    // Sprints table - one row per remote sprint, updated in place on sync
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sprints (
            id TEXT PRIMARY KEY,
            remote_id INTEGER NOT NULL UNIQUE,
            name TEXT NOT NULL,
            state TEXT NOT NULL,
            start_date TEXT,
            end_date TEXT
        )",
        [],
    )?;

    // Issues table - append-only snapshots, one row per issue per sync
    conn.execute(
        "CREATE TABLE IF NOT EXISTS issues (
            id TEXT PRIMARY KEY,
            key TEXT NOT NULL,
            summary TEXT NOT NULL,
            status TEXT NOT NULL,
            story_points REAL NOT NULL DEFAULT 0,
            created_at TEXT,
            assignee_name TEXT NOT NULL DEFAULT '',
            assignee_email TEXT NOT NULL DEFAULT '',
            synced_on TEXT NOT NULL,
            sprint_id TEXT NOT NULL REFERENCES sprints(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_issues_sprint_synced ON issues(sprint_id, synced_on)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sprints_state ON sprints(state)",
        [],
    )?;

    Ok(())
}
