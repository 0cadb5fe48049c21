pub mod error;
pub mod http;
pub mod jira;
pub mod pagination;
pub mod time;
pub mod traits;

pub use error::{ClientError, Result};
pub use jira::{Credentials, JiraClient, DEFAULT_PAGE_SIZE, DEFAULT_STORY_POINTS_FIELD};
pub use time::parse_jira_timestamp;
pub use traits::{Assignee, IssueTracker, RemoteIssue, RemoteSprint};
