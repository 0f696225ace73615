//! Storage adapter error types.

use thiserror::Error;

/// Errors surfaced by the credential and resource store adapters.
///
/// Adapters classify duplicate-key violations structurally so callers never
/// inspect vendor error text.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Duplicate key")]
    DuplicateKey,

    /// Any other adapter failure
    #[error("Store error: {0}")]
    Other(String),
}

impl StoreError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            StoreError::DuplicateKey => "Conflict".to_string(),
            StoreError::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::DuplicateKey
            }
            _ => StoreError::Other(err.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;
