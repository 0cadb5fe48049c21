use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures reading from or writing to the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to prepare database location: {0}")]
    Io(#[from] std::io::Error),

    /// Unique constraint on a sprint's remote id
    #[error("sprint with remote id {remote_id} already exists")]
    DuplicateKey { remote_id: i64 },

    #[error("{0} not found")]
    NotFound(String),
}

impl StoreError {
    /// True for lookups that matched no row
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
