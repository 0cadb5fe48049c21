use thiserror::Error;

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures talking to the remote tracker.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad credentials or an endpoint that could not be reached during login
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The remote answered a read request with a non-success status
    #[error("{api} API error ({status}): {body}")]
    Fetch {
        api: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// Transport-level failure (connect, timeout, TLS)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body that does not have the expected shape
    #[error("failed to decode response: {0}")]
    Parse(String),
}
