//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User ID type (opaque string, UUID v4 for registered users)
pub type UserId = String;

/// Credential record as held by the credential store
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Email/passcode pair submitted to register or login
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub passcode: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("passcode", &"<redacted>")
            .finish()
    }
}

/// Claims carried inside a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "uid")]
    pub user_id: UserId,
    #[serde(rename = "exp")]
    pub expires_at: DateTime<Utc>,
}

/// Identity resolved for the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
}

impl Identity {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// Result of a successful register or login
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// `Set-Cookie` header value carrying the token
    pub set_cookie: String,
}

/// Answer of the identity probe; `user_id` is empty for anonymous callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Probe {
    pub user_id: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dev: bool,
}

impl Probe {
    pub fn anonymous() -> Self {
        Self {
            user_id: String::new(),
            dev: false,
        }
    }
}
