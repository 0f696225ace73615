//! Authentication error types.

use thiserror::Error;

use crate::db::StoreError;

/// Reasons a session token is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token is not exactly `payload.signature`
    #[error("Malformed token")]
    Malformed,

    /// Signature does not match the payload under the server secret
    #[error("Token signature mismatch")]
    SignatureMismatch,

    /// Payload is not valid base64 or does not hold the expected claims
    #[error("Token payload could not be decoded")]
    Decode,

    /// Expiry instant has passed
    #[error("Token expired")]
    Expired,
}

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Unknown email or wrong passcode; the two are never told apart
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No session cookie on a protected request
    #[error("Authentication required")]
    MissingSession,

    /// Session token rejected
    #[error("Invalid session: {0}")]
    Token(#[from] TokenError),

    /// Server secret missing or unusable
    #[error("Invalid secret: {0}")]
    InvalidSecret(String),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Credential store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Every token failure reads the same, and store or hashing failures
    /// never expose internals.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Validation(msg) => msg.clone(),
            AuthError::EmailTaken => "email already registered".to_string(),
            AuthError::InvalidCredentials => "invalid credentials".to_string(),
            AuthError::MissingSession | AuthError::Token(_) => "auth required".to_string(),
            AuthError::InvalidSecret(_) | AuthError::HashingFailed | AuthError::Store(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
