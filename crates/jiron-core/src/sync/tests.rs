use super::*;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};

use jiron_integrations::{Assignee as RemoteAssignee, ClientError};
use jiron_storage::StoreError;

use crate::error::SyncError;

// ============================================================================
// Test tracker
// ============================================================================

#[derive(Default)]
struct FakeTracker {
    issues: Vec<RemoteIssue>,
    sprints: Vec<RemoteSprint>,
    fail_fetch: bool,
    issue_fetches: AtomicUsize,
}

impl FakeTracker {
    fn with_issues(issues: Vec<RemoteIssue>) -> Self {
        Self {
            issues,
            ..Self::default()
        }
    }

    fn with_sprints(sprints: Vec<RemoteSprint>) -> Self {
        Self {
            sprints,
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail_fetch: true,
            ..Self::default()
        }
    }

    fn fetch_error() -> ClientError {
        ClientError::Parse("page 2 of 3 could not be decoded".to_string())
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn fetch_sprint_issues(
        &self,
        _project_key: &str,
        _sprint_id: i64,
    ) -> jiron_integrations::Result<Vec<RemoteIssue>> {
        self.issue_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch {
            return Err(Self::fetch_error());
        }
        Ok(self.issues.clone())
    }

    async fn fetch_sprints_on_board(
        &self,
        _board_id: i64,
        _states: &[String],
    ) -> jiron_integrations::Result<Vec<RemoteSprint>> {
        if self.fail_fetch {
            return Err(Self::fetch_error());
        }
        Ok(self.sprints.clone())
    }

    async fn fetch_sprint(&self, sprint_id: i64) -> jiron_integrations::Result<RemoteSprint> {
        self.sprints
            .iter()
            .find(|s| s.id == sprint_id)
            .cloned()
            .ok_or_else(Self::fetch_error)
    }

    fn system_name(&self) -> &'static str {
        "fake"
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn sync_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap()
}

fn remote_issue(key: &str, status: &str, story_points: f64) -> RemoteIssue {
    RemoteIssue {
        key: key.to_string(),
        summary: format!("Work on {key}"),
        status: status.to_string(),
        story_points,
        created_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()),
        assignee: RemoteAssignee {
            name: "Kai".to_string(),
            email: "kai@example.com".to_string(),
        },
        synced_on: sync_time(),
    }
}

fn remote_sprint(id: i64, name: &str, state: &str) -> RemoteSprint {
    RemoteSprint {
        id,
        name: name.to_string(),
        state: state.to_string(),
        start_date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()),
        end_date: Some(Utc.with_ymd_and_hms(2024, 3, 14, 17, 0, 0).unwrap()),
    }
}

fn target() -> SyncTarget {
    SyncTarget::from(&Config::default())
}

fn service_with(database: Database) -> Arc<SyncService> {
    Arc::new(SyncService::new(Arc::new(database), target()))
}

/// Service with sprint 42 already stored
fn service_with_sprint() -> (Arc<SyncService>, Sprint) {
    let database = Database::in_memory().unwrap();
    let sprint = database
        .create_sprint(&Sprint::new(42, "Sprint 42".to_string(), "active".to_string()))
        .unwrap();
    (service_with(database), sprint)
}

/// File-backed database plus a raw connection to the same file for installing
/// failure triggers
fn file_database() -> (tempfile::TempDir, Database, rusqlite::Connection) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jiron.db");
    let database = Database::open(Some(path.clone())).unwrap();
    let raw = rusqlite::Connection::open(&path).unwrap();
    (dir, database, raw)
}

// ============================================================================
// Issue sync
// ============================================================================

#[tokio::test]
async fn test_sync_issues_saves_one_snapshot_per_issue() {
    let (service, sprint) = service_with_sprint();
    let tracker = FakeTracker::with_issues(vec![
        remote_issue("STIP-1", "To Do", 3.0),
        remote_issue("STIP-2", "In Progress", 5.0),
        remote_issue("STIP-3", "Done", 0.0),
    ]);

    let report = service.sync_issues(&tracker, 42).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.saved, 3);
    assert!(report.is_complete_success());

    let stored = service.database().list_issues().unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|i| i.sprint_id == sprint.id));
    assert!(stored.iter().all(|i| i.synced_on == sync_time()));
    assert_eq!(stored[0].assignee.email, "kai@example.com");
}

#[tokio::test]
async fn test_repeated_issue_sync_appends_snapshots() {
    let (service, sprint) = service_with_sprint();
    let tracker = FakeTracker::with_issues(vec![remote_issue("STIP-1", "To Do", 3.0)]);

    service.sync_issues(&tracker, 42).await.unwrap();
    service.sync_issues(&tracker, 42).await.unwrap();

    let stored = service.database().list_issues_for_sprint(sprint.id).unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_sync_issues_fetch_failure_writes_nothing() {
    let (service, _) = service_with_sprint();
    let tracker = FakeTracker::failing();

    let err = service.sync_issues(&tracker, 42).await.unwrap_err();

    assert!(matches!(err, SyncError::Client(_)));
    assert!(service.database().list_issues().unwrap().is_empty());
}

#[tokio::test]
async fn test_sync_issues_unknown_sprint_skips_fetch() {
    let service = service_with(Database::in_memory().unwrap());
    let tracker = FakeTracker::with_issues(vec![remote_issue("STIP-1", "To Do", 3.0)]);

    let err = service.sync_issues(&tracker, 99).await.unwrap_err();

    assert!(matches!(err, SyncError::Store(StoreError::NotFound(_))));
    assert_eq!(tracker.issue_fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_sync_issues_continues_past_failed_save() {
    let (_dir, database, raw) = file_database();
    database
        .create_sprint(&Sprint::new(42, "Sprint 42".to_string(), "active".to_string()))
        .unwrap();
    raw.execute_batch(
        "CREATE TRIGGER reject_stip_2 BEFORE INSERT ON issues
         WHEN NEW.key = 'STIP-2'
         BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
    )
    .unwrap();

    let service = service_with(database);
    let tracker = FakeTracker::with_issues(vec![
        remote_issue("STIP-1", "To Do", 1.0),
        remote_issue("STIP-2", "To Do", 2.0),
        remote_issue("STIP-3", "To Do", 3.0),
    ]);

    let report = service.sync_issues(&tracker, 42).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.saved, 2);
    assert_eq!(report.failed, 1);
    assert!(report.errors[0].starts_with("STIP-2"));
    assert!(!report.is_complete_success());

    let keys: Vec<String> = service
        .database()
        .list_issues()
        .unwrap()
        .into_iter()
        .map(|i| i.key)
        .collect();
    assert_eq!(keys, vec!["STIP-1", "STIP-3"]);
}

// ============================================================================
// Sprint sync
// ============================================================================

#[tokio::test]
async fn test_sync_sprints_upserts_by_remote_id() {
    let service = service_with(Database::in_memory().unwrap());

    let first = FakeTracker::with_sprints(vec![
        remote_sprint(1, "Sprint 1", "active"),
        remote_sprint(2, "Sprint 2", "future"),
    ]);
    let report = service.sync_sprints(&first).await.unwrap();
    assert_eq!(report.saved, 2);
    let before = service.database().get_sprint(1).unwrap();

    let second = FakeTracker::with_sprints(vec![
        remote_sprint(1, "Sprint 1 (wrapped up)", "closed"),
        remote_sprint(2, "Sprint 2", "active"),
    ]);
    service.sync_sprints(&second).await.unwrap();

    let sprints = service.database().list_sprints(&[]).unwrap();
    assert_eq!(sprints.len(), 2);

    let after = service.database().get_sprint(1).unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.name, "Sprint 1 (wrapped up)");
    assert_eq!(after.state, "closed");
    assert_eq!(after.start_date, before.start_date);
}

#[tokio::test]
async fn test_sync_sprints_failure_rolls_back_whole_batch() {
    let (_dir, database, raw) = file_database();
    let existing = database
        .create_sprint(&Sprint::new(1, "Sprint 1".to_string(), "active".to_string()))
        .unwrap();
    raw.execute_batch(
        "CREATE TRIGGER reject_sprint_3 BEFORE INSERT ON sprints
         WHEN NEW.remote_id = 3
         BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
    )
    .unwrap();

    let service = service_with(database);
    let tracker = FakeTracker::with_sprints(vec![
        remote_sprint(1, "Sprint 1 renamed", "closed"),
        remote_sprint(2, "Sprint 2", "closed"),
        remote_sprint(3, "Sprint 3", "active"),
        remote_sprint(4, "Sprint 4", "future"),
        remote_sprint(5, "Sprint 5", "future"),
    ]);

    let err = service.sync_sprints(&tracker).await.unwrap_err();
    assert!(matches!(err, SyncError::Store(_)));

    let sprints = service.database().list_sprints(&[]).unwrap();
    assert_eq!(sprints, vec![existing]);
}

#[tokio::test]
async fn test_sync_sprints_fetch_failure_writes_nothing() {
    let service = service_with(Database::in_memory().unwrap());

    let err = service.sync_sprints(&FakeTracker::failing()).await.unwrap_err();

    assert!(matches!(err, SyncError::Client(_)));
    assert!(service.database().list_sprints(&[]).unwrap().is_empty());
}

#[tokio::test]
async fn test_import_sprint_creates_once() {
    let service = service_with(Database::in_memory().unwrap());
    let tracker = FakeTracker::with_sprints(vec![remote_sprint(8, "Sprint 8", "future")]);

    let imported = service.import_sprint(&tracker, 8).await.unwrap();
    assert_eq!(imported.remote_id, 8);
    assert_eq!(service.database().get_sprint(8).unwrap(), imported);

    let err = service.import_sprint(&tracker, 8).await.unwrap_err();
    assert!(matches!(
        err,
        SyncError::Store(StoreError::DuplicateKey { remote_id: 8 })
    ));
}

// ============================================================================
// Background tasks
// ============================================================================

#[tokio::test]
async fn test_spawned_issue_sync_can_be_awaited() {
    let (service, _) = service_with_sprint();
    let tracker: Arc<dyn IssueTracker> =
        Arc::new(FakeTracker::with_issues(vec![remote_issue("STIP-1", "To Do", 2.0)]));

    let report = service.spawn_issue_sync(tracker, 42).await.unwrap().unwrap();

    assert_eq!(report.saved, 1);
    assert_eq!(service.database().list_issues().unwrap().len(), 1);
}

#[tokio::test]
async fn test_spawned_sprint_sync_reports_failure_through_handle() {
    let service = service_with(Database::in_memory().unwrap());
    let tracker: Arc<dyn IssueTracker> = Arc::new(FakeTracker::failing());

    let result = service.spawn_sprint_sync(tracker).await.unwrap();

    assert!(matches!(result, Err(SyncError::Client(_))));
}

#[test]
fn test_sync_report_display() {
    let mut report = SyncReport::new(3);
    report.record_success();
    report.record_success();
    report.record_failure("STIP-3: disk full".to_string());

    assert_eq!(report.to_string(), "Fetched: 3, Saved: 2, Failed: 1");
}
