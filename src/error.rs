use thiserror::Error;

/// Failure conditions surfaced by the expense store.
///
/// Engine errors are logged where they occur and carried here as text; the
/// host decides how to present them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Store used before initialization")]
    NotInitialized,
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl StoreError {
    /// True when the database could not be opened or set up at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::StorageUnavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}
