use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::http::ResponseExt;
use crate::pagination::{collect_pages, Page};
use crate::time::parse_optional;
use crate::traits::{Assignee, IssueTracker, RemoteIssue, RemoteSprint};

/// Custom field Jira Cloud uses for story point estimates by default
pub const DEFAULT_STORY_POINTS_FIELD: &str = "customfield_10016";

/// Default number of results requested per page
pub const DEFAULT_PAGE_SIZE: usize = 50;

// ============================================================================
// API Response Types
// ============================================================================

/// `/rest/api/2/search` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    start_at: usize,
    #[serde(default)]
    total: usize,
    #[serde(default)]
    issues: Vec<JiraIssue>,
}

#[derive(Debug, Deserialize)]
struct JiraIssue {
    key: String,
    fields: JiraIssueFields,
}

#[derive(Debug, Deserialize)]
struct JiraIssueFields {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    status: Option<JiraStatus>,
    #[serde(default)]
    created: Option<String>,
    #[serde(default)]
    assignee: Option<JiraUser>,
    /// Custom fields (story points among them) keyed by field id
    #[serde(flatten)]
    custom: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct JiraStatus {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraUser {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    email_address: Option<String>,
}

/// Agile API sprint representation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraSprint {
    id: i64,
    name: String,
    state: String,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

/// Agile API paginated list wrapper
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgilePage<T> {
    #[serde(default = "default_is_last")]
    is_last: bool,
    values: Vec<T>,
}

const fn default_is_last() -> bool {
    true
}

// ============================================================================
// Jira Client
// ============================================================================

/// Credentials for Jira Cloud basic auth
#[derive(Debug, Clone)]
pub struct Credentials {
    pub base_url: String,
    pub username: String,
    pub api_token: String,
}

/// Jira REST + Agile API client
pub struct JiraClient {
    base_url: String,
    username: String,
    api_token: String,
    story_points_field: String,
    page_size: usize,
    client: reqwest::Client,
}

impl JiraClient {
    /// Create a new Jira client without contacting the server
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(credentials: Credentials) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let base_url = credentials.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            base_url,
            username: credentials.username,
            api_token: credentials.api_token,
            story_points_field: DEFAULT_STORY_POINTS_FIELD.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            client,
        })
    }

    /// Create a client and verify the credentials against `/rest/api/2/myself`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] if the credentials are rejected or the
    /// server cannot be reached
    pub async fn authenticate(credentials: Credentials) -> Result<Self> {
        let client = Self::new(credentials)?;
        client.validate_credentials().await?;
        log::info!("Authenticated with Jira at {}", client.base_url);
        Ok(client)
    }

    /// Use a different custom field for story points
    #[must_use]
    pub fn with_story_points_field(mut self, field: impl Into<String>) -> Self {
        self.story_points_field = field.into();
        self
    }

    /// Change the page size used for paginated requests
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Verify the credentials with a cheap authenticated call
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] on rejection or connection failure
    pub async fn validate_credentials(&self) -> Result<()> {
        let url = self.api_url("rest/api/2/myself");
        log::debug!("Validating Jira credentials: {url}");

        self.client
            .get(&url)
            .basic_auth(&self.username, Some(&self.api_token))
            .send()
            .await
            .map_err(|e| ClientError::Auth(format!("cannot reach {}: {e}", self.base_url)))?
            .ensure_success("Jira")
            .await
            .map_err(|e| match e {
                ClientError::Auth(_) => e,
                other => ClientError::Auth(other.to_string()),
            })?;

        Ok(())
    }

    /// Make an authenticated GET request with bound query parameters
    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.api_url(path);
        log::debug!("GET {url} {query:?}");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.api_token))
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?
            .ensure_success("Jira")
            .await?;

        response
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("{path}: {e}")))
    }

    async fn search_page(&self, jql: &str, start_at: usize) -> Result<Page<JiraIssue>> {
        let fields = format!("summary,status,created,assignee,{}", self.story_points_field);
        let response: SearchResponse = self
            .get(
                "rest/api/2/search",
                &[
                    ("jql", jql.to_string()),
                    ("startAt", start_at.to_string()),
                    ("maxResults", self.page_size.to_string()),
                    ("fields", fields),
                ],
            )
            .await?;

        let is_last = response.start_at + response.issues.len() >= response.total;
        Ok(Page {
            items: response.issues,
            is_last,
        })
    }

    async fn board_sprint_page(
        &self,
        board_id: i64,
        state: &str,
        start_at: usize,
    ) -> Result<Page<JiraSprint>> {
        let mut query = vec![
            ("startAt", start_at.to_string()),
            ("maxResults", self.page_size.to_string()),
        ];
        if !state.is_empty() {
            query.push(("state", state.to_string()));
        }

        let response: AgilePage<JiraSprint> = self
            .get(&format!("rest/agile/1.0/board/{board_id}/sprint"), &query)
            .await?;

        Ok(Page {
            items: response.values,
            is_last: response.is_last,
        })
    }
}

/// JQL selecting every issue of a project in one sprint
fn sprint_issues_jql(project_key: &str, sprint_id: i64) -> String {
    let key = project_key.trim().replace('"', "");
    format!("project = \"{key}\" AND sprint = {sprint_id}")
}

/// Read story points from the configured custom field.
///
/// Missing, null or non-numeric values count as zero.
fn story_points(fields: &JiraIssueFields, field: &str) -> f64 {
    match fields.custom.get(field) {
        None | Some(serde_json::Value::Null) => 0.0,
        Some(value) => value.as_f64().unwrap_or_else(|| {
            log::warn!("Story point field {field} has unexpected value {value}, using 0");
            0.0
        }),
    }
}

fn to_remote_issue(
    issue: JiraIssue,
    story_points_field: &str,
    synced_on: DateTime<Utc>,
) -> RemoteIssue {
    let story_points = story_points(&issue.fields, story_points_field);
    let fields = issue.fields;

    let assignee = fields
        .assignee
        .map(|user| Assignee {
            name: user.display_name.unwrap_or_default(),
            email: user.email_address.unwrap_or_default(),
        })
        .unwrap_or_default();

    RemoteIssue {
        key: issue.key,
        summary: fields.summary,
        status: fields.status.map(|s| s.name).unwrap_or_default(),
        story_points,
        created_at: parse_optional("created", fields.created.as_deref()),
        assignee,
        synced_on,
    }
}

fn to_remote_sprint(sprint: JiraSprint) -> RemoteSprint {
    RemoteSprint {
        id: sprint.id,
        start_date: parse_optional("startDate", sprint.start_date.as_deref()),
        end_date: parse_optional("endDate", sprint.end_date.as_deref()),
        name: sprint.name,
        state: sprint.state,
    }
}

// ============================================================================
// IssueTracker Trait Implementation
// ============================================================================

#[async_trait]
impl IssueTracker for JiraClient {
    async fn fetch_sprint_issues(
        &self,
        project_key: &str,
        sprint_id: i64,
    ) -> Result<Vec<RemoteIssue>> {
        let jql = sprint_issues_jql(project_key, sprint_id);
        let synced_on = Utc::now().trunc_subsecs(3);

        log::debug!("Searching Jira issues: {jql}");

        let issues = collect_pages(|start_at| self.search_page(&jql, start_at)).await?;

        log::info!("{} issues found for sprint {sprint_id}", issues.len());

        Ok(issues
            .into_iter()
            .map(|issue| to_remote_issue(issue, &self.story_points_field, synced_on))
            .collect())
    }

    async fn fetch_sprints_on_board(
        &self,
        board_id: i64,
        states: &[String],
    ) -> Result<Vec<RemoteSprint>> {
        let state = states.join(",");

        let sprints =
            collect_pages(|start_at| self.board_sprint_page(board_id, &state, start_at)).await?;

        log::info!("{} sprints found on board {board_id}", sprints.len());

        Ok(sprints.into_iter().map(to_remote_sprint).collect())
    }

    async fn fetch_sprint(&self, sprint_id: i64) -> Result<RemoteSprint> {
        let sprint: JiraSprint = self
            .get(&format!("rest/agile/1.0/sprint/{sprint_id}"), &[])
            .await?;
        Ok(to_remote_sprint(sprint))
    }

    fn system_name(&self) -> &'static str {
        "jira"
    }
}

// ============================================================================
// Tests
// ============================================================================
