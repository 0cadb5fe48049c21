use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use jiron_integrations::{Credentials, DEFAULT_PAGE_SIZE, DEFAULT_STORY_POINTS_FIELD};

use crate::error::{Result, SyncError};

/// Application configuration, read from `config.toml` with environment overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub jira: JiraConfig,
    pub sync: SyncConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    pub base_url: Option<String>,
    pub username: Option<String>,
    pub api_token: Option<String>,
    pub project_key: String,
    pub board_id: i64,
    pub story_points_field: String,
    pub page_size: usize,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            username: None,
            api_token: None,
            project_key: "STIP".to_string(),
            board_id: 2,
            story_points_field: DEFAULT_STORY_POINTS_FIELD.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Sprint states pulled by a sprint sync
    pub sprint_states: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sprint_states: vec![
                "closed".to_string(),
                "active".to_string(),
                "future".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `path`, or from the default location if none is
    /// given, then apply environment overrides.
    ///
    /// A missing file at the default location is not an error; a missing
    /// explicit path is.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::read_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        log::debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SyncError::Config(e.to_string()))
    }

    /// Override file values with `JIRA_BASE_URL`, `JIRA_USERNAME`,
    /// `JIRA_API_TOKEN` and `JIRON_DATABASE` when `lookup` returns them
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("JIRA_BASE_URL") {
            self.jira.base_url = Some(url);
        }
        if let Some(username) = lookup("JIRA_USERNAME") {
            self.jira.username = Some(username);
        }
        if let Some(token) = lookup("JIRA_API_TOKEN") {
            self.jira.api_token = Some(token);
        }
        if let Some(path) = lookup("JIRON_DATABASE") {
            self.database.path = Some(PathBuf::from(path));
        }
    }

    /// Jira credentials, failing on the first missing value
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Config`] naming the missing key
    pub fn credentials(&self) -> Result<Credentials> {
        fn required(value: Option<&String>, key: &str) -> Result<String> {
            value
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .ok_or_else(|| SyncError::Config(format!("missing jira.{key}")))
        }

        Ok(Credentials {
            base_url: required(self.jira.base_url.as_ref(), "base_url")?,
            username: required(self.jira.username.as_ref(), "username")?,
            api_token: required(self.jira.api_token.as_ref(), "api_token")?,
        })
    }
}

/// `<config_dir>/jiron/config.toml`
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("jiron");
    path.push("config.toml");
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.jira.project_key, "STIP");
        assert_eq!(config.jira.board_id, 2);
        assert_eq!(config.jira.story_points_field, "customfield_10016");
        assert_eq!(config.sync.sprint_states, vec!["closed", "active", "future"]);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [jira]
            base_url = "https://acme.atlassian.net"
            board_id = 7

            [database]
            path = "/tmp/jiron.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.jira.base_url.as_deref(), Some("https://acme.atlassian.net"));
        assert_eq!(config.jira.board_id, 7);
        assert_eq!(config.jira.project_key, "STIP");
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/jiron.db")));
        assert_eq!(config.sync, SyncConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml_str("[jira\nboard_id = ").unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("JIRA_USERNAME", "dev@example.com"),
            ("JIRA_API_TOKEN", "secret"),
            ("JIRON_DATABASE", "/var/lib/jiron.db"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::from_toml_str(
            "[jira]\nbase_url = \"https://acme.atlassian.net\"\nusername = \"file-user\"",
        )
        .unwrap();
        config.apply_env_overrides(|key| env.get(key).map(ToString::to_string));

        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.base_url, "https://acme.atlassian.net");
        assert_eq!(credentials.username, "dev@example.com");
        assert_eq!(credentials.api_token, "secret");
        assert_eq!(config.database.path, Some(PathBuf::from("/var/lib/jiron.db")));
    }

    #[test]
    fn test_missing_credentials_named() {
        let mut config = Config::default();
        config.jira.base_url = Some("https://acme.atlassian.net".to_string());
        config.jira.username = Some("dev@example.com".to_string());

        let err = config.credentials().unwrap_err();
        assert!(err.to_string().contains("jira.api_token"));
    }
}
