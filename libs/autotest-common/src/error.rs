use thiserror::Error;

/// Errors surfaced by a [`TestCaseStore`](crate::store::TestCaseStore)
#[derive(Debug, Error)]
pub enum StoreError {
    /// Client supplied invalid data
    #[error("{0}")]
    Validation(String),

    #[error("test case {0} not found")]
    NotFound(i64),

    /// Storage unavailable or failed unexpectedly
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(e: r2d2::Error) -> Self {
        StoreError::Backend(format!("connection pool: {}", e))
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        StoreError::Backend(format!("blocking task failed: {}", e))
    }
}
