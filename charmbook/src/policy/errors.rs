//! Resource error types.

use thiserror::Error;

use crate::db::StoreError;

/// Errors from page and charm operations
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Resource absent, or present but owned by someone else
    #[error("not found")]
    NotFound,

    /// Public read of a resource that is not public
    #[error("private")]
    Forbidden,

    /// Resource store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ResourceError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            ResourceError::Store(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

/// Result type for resource operations
pub type ResourceResult<T> = Result<T, ResourceError>;
