//! Sync cycles: pull issues or sprints from the tracker and persist them.
//!
//! Issue syncs append one snapshot row per fetched issue; individual save
//! failures are logged and skipped. Sprint syncs upsert the whole batch in a
//! single transaction and roll everything back if any upsert fails.

#[cfg(test)]
mod tests;

use std::sync::Arc;
use tokio::task::JoinHandle;

use jiron_integrations::{IssueTracker, RemoteIssue, RemoteSprint};
use jiron_storage::{Assignee, Database, Issue, Sprint};

use crate::config::Config;
use crate::error::Result;

/// Outcome of one sync cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Items returned by the tracker
    pub total: usize,
    /// Rows written (inserted snapshots or upserted sprints)
    pub saved: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl SyncReport {
    /// Create a new sync report
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Record a successful write
    pub fn record_success(&mut self) {
        self.saved += 1;
    }

    /// Record a failed write with error message
    pub fn record_failure(&mut self, error: String) {
        self.failed += 1;
        self.errors.push(error);
    }

    /// Check if every fetched item was written
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0 && self.saved == self.total
    }
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fetched: {}, Saved: {}", self.total, self.saved)?;
        if self.failed > 0 {
            write!(f, ", Failed: {}", self.failed)?;
        }
        Ok(())
    }
}

/// Which tracker project and board a sync targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub project_key: String,
    pub board_id: i64,
    pub sprint_states: Vec<String>,
}

impl From<&Config> for SyncTarget {
    fn from(config: &Config) -> Self {
        Self {
            project_key: config.jira.project_key.clone(),
            board_id: config.jira.board_id,
            sprint_states: config.sync.sprint_states.clone(),
        }
    }
}

/// Drives issue and sprint sync cycles against one local database.
///
/// Callers authenticate the tracker before handing it in.
pub struct SyncService {
    database: Arc<Database>,
    target: SyncTarget,
}

impl SyncService {
    #[must_use]
    pub fn new(database: Arc<Database>, target: SyncTarget) -> Self {
        Self { database, target }
    }

    #[must_use]
    pub fn database(&self) -> &Arc<Database> {
        &self.database
    }

    /// Fetch every issue of a sprint and store one snapshot per issue.
    ///
    /// The sprint must already be known locally (see [`Self::sync_sprints`]
    /// and [`Self::import_sprint`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the sprint is unknown locally or the fetch fails;
    /// nothing is written in either case. Individual save failures are only
    /// recorded in the report.
    pub async fn sync_issues(
        &self,
        tracker: &dyn IssueTracker,
        sprint_remote_id: i64,
    ) -> Result<SyncReport> {
        log::info!(
            "Syncing {} issues for sprint {sprint_remote_id} (project {})",
            tracker.system_name(),
            self.target.project_key
        );

        let sprint = self.database.get_sprint(sprint_remote_id)?;

        let remote_issues = tracker
            .fetch_sprint_issues(&self.target.project_key, sprint_remote_id)
            .await?;

        let mut report = SyncReport::new(remote_issues.len());

        for remote in &remote_issues {
            let issue = to_issue(remote, &sprint);
            match self.database.save_issue(&issue) {
                Ok(_) => report.record_success(),
                Err(e) => {
                    log::warn!("Failed to save issue {}: {e}", remote.key);
                    report.record_failure(format!("{}: {e}", remote.key));
                }
            }
        }

        log::info!("Issue sync complete for sprint {sprint_remote_id}: {report}");
        Ok(report)
    }

    /// Fetch the board's sprints and upsert them as one all-or-nothing batch
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or any upsert fails; in the latter
    /// case the whole batch is rolled back
    pub async fn sync_sprints(&self, tracker: &dyn IssueTracker) -> Result<SyncReport> {
        log::info!(
            "Syncing {} sprints on board {} ({})",
            tracker.system_name(),
            self.target.board_id,
            self.target.sprint_states.join(", ")
        );

        let remote_sprints = tracker
            .fetch_sprints_on_board(self.target.board_id, &self.target.sprint_states)
            .await?;

        let report = persist_sprint_batch(&self.database, &remote_sprints)?;

        log::info!("Sprint sync complete: {report}");
        Ok(report)
    }

    /// Fetch one sprint by remote id and create it locally
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or the sprint already exists locally
    pub async fn import_sprint(
        &self,
        tracker: &dyn IssueTracker,
        sprint_remote_id: i64,
    ) -> Result<Sprint> {
        let remote = tracker.fetch_sprint(sprint_remote_id).await?;
        let sprint = self.database.create_sprint(&to_sprint(&remote))?;
        log::info!("Imported sprint {} ({})", sprint.remote_id, sprint.name);
        Ok(sprint)
    }

    /// Run an issue sync on the runtime without waiting for it.
    ///
    /// The handle may be dropped; failures are logged inside the task either way.
    pub fn spawn_issue_sync(
        self: &Arc<Self>,
        tracker: Arc<dyn IssueTracker>,
        sprint_remote_id: i64,
    ) -> JoinHandle<Result<SyncReport>> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let result = service.sync_issues(tracker.as_ref(), sprint_remote_id).await;
            if let Err(e) = &result {
                log::error!("Issue sync for sprint {sprint_remote_id} failed: {e}");
            }
            result
        })
    }

    /// Run a sprint sync on the runtime without waiting for it.
    ///
    /// The handle may be dropped; failures are logged inside the task either way.
    pub fn spawn_sprint_sync(
        self: &Arc<Self>,
        tracker: Arc<dyn IssueTracker>,
    ) -> JoinHandle<Result<SyncReport>> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let result = service.sync_sprints(tracker.as_ref()).await;
            if let Err(e) = &result {
                log::error!("Sprint sync failed: {e}");
            }
            result
        })
    }
}

/// Upsert every sprint inside one transaction; roll back on the first failure
fn persist_sprint_batch(
    database: &Database,
    remote_sprints: &[RemoteSprint],
) -> Result<SyncReport> {
    let mut report = SyncReport::new(remote_sprints.len());
    let tx = database.begin()?;

    for remote in remote_sprints {
        if let Err(e) = tx.upsert(&to_sprint(remote)) {
            log::error!("Failed to upsert sprint {}: {e}; rolling back batch", remote.id);
            if let Err(rollback_err) = tx.rollback() {
                log::error!("Rollback failed: {rollback_err}");
            }
            return Err(e.into());
        }
        report.record_success();
    }

    tx.commit()?;
    Ok(report)
}

fn to_issue(remote: &RemoteIssue, sprint: &Sprint) -> Issue {
    Issue {
        key: remote.key.clone(),
        summary: remote.summary.clone(),
        status: remote.status.clone(),
        story_points: remote.story_points,
        created_at: remote.created_at,
        assignee: Assignee {
            name: remote.assignee.name.clone(),
            email: remote.assignee.email.clone(),
        },
        synced_on: remote.synced_on,
        sprint_id: sprint.id,
    }
}

fn to_sprint(remote: &RemoteSprint) -> Sprint {
    Sprint::new(remote.id, remote.name.clone(), remote.state.clone())
        .with_dates(remote.start_date, remote.end_date)
}
