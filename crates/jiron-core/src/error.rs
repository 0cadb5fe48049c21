use jiron_integrations::ClientError;
use jiron_storage::StoreError;
use thiserror::Error;

/// Result type for sync and aggregation operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}
