//! HTTP utilities for API integrations.

use crate::error::{ClientError, Result};

/// Extension trait for `reqwest::Response` to handle common error patterns.
#[async_trait::async_trait]
pub trait ResponseExt {
    /// Ensure the response status is successful, returning an error with details if not.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] for 401/403 and [`ClientError::Fetch`]
    /// (carrying the status code and response body) for any other non-2xx status.
    async fn ensure_success(self, api_name: &'static str) -> Result<Self>
    where
        Self: Sized;
}

#[async_trait::async_trait]
impl ResponseExt for reqwest::Response {
    async fn ensure_success(self, api_name: &'static str) -> Result<Self> {
        let status = self.status();
        if status.is_success() {
            return Ok(self);
        }

        let body = self.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ClientError::Auth(format!("{api_name} API rejected credentials ({status})")));
        }

        Err(ClientError::Fetch {
            api: api_name,
            status,
            body,
        })
    }
}
