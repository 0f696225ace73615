//! Session manager: registration, login and logout.

use super::{
    cookie::SessionCookie,
    errors::{AuthError, AuthResult},
    models::{IssuedSession, User, UserId},
    password::PasscodeHasher,
    token::{TokenCodec, session_ttl},
};
use crate::db::{StoreError, UserRepository};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Session manager
#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserRepository>,
    hasher: PasscodeHasher,
    codec: TokenCodec,
    cookie: SessionCookie,
    session_duration: Duration,
}

impl SessionManager {
    /// Create a new session manager
    ///
    /// # Arguments
    ///
    /// * `users` - Credential store
    /// * `hasher` - Passcode hasher
    /// * `codec` - Token codec holding the server secret
    /// * `cookie` - Session cookie settings (carries the `Secure` toggle)
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasscodeHasher,
        codec: TokenCodec,
        cookie: SessionCookie,
    ) -> Self {
        Self {
            users,
            hasher,
            codec,
            cookie,
            session_duration: session_ttl(),
        }
    }

    /// Register a new user and start a session for them
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Email or passcode empty (storage untouched)
    /// * `AuthError::EmailTaken` - Email already registered, ignoring case and surrounding whitespace
    /// * `AuthError::Store` - Credential store failure
    pub async fn register(&self, email: &str, passcode: &str) -> AuthResult<IssuedSession> {
        let email = normalize_email(email);
        if email.is_empty() || passcode.is_empty() {
            return Err(AuthError::Validation(
                "email and passcode required".to_string(),
            ));
        }

        let password_hash = self.hasher.hash_blocking(passcode.to_string()).await?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            created_at: Utc::now(),
        };

        match self.users.insert_user(&user).await {
            Ok(()) => {}
            Err(StoreError::DuplicateKey) => return Err(AuthError::EmailTaken),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %user.id, "User registered");
        Ok(self.issue_session(user.id))
    }

    /// Log a user in
    ///
    /// Unknown emails and wrong passcodes both yield
    /// `AuthError::InvalidCredentials` after the same amount of hashing work.
    pub async fn login(&self, email: &str, passcode: &str) -> AuthResult<IssuedSession> {
        let email = normalize_email(email);
        let user = self.users.find_by_email(&email).await?;

        let (user_id, stored_hash) = match user {
            Some(user) => (Some(user.id), Some(user.password_hash)),
            None => (None, None),
        };

        let verified = self
            .hasher
            .verify_blocking(passcode.to_string(), stored_hash)
            .await;

        match user_id {
            Some(user_id) if verified => {
                tracing::debug!(user_id = %user_id, "User logged in");
                Ok(self.issue_session(user_id))
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    /// Clear the session cookie
    ///
    /// Needs no identity and is idempotent. Tokens are stateless, so a copy
    /// of the old token held elsewhere stays valid until it expires.
    pub fn logout(&self) -> String {
        self.cookie.clear()
    }

    /// Make sure a fixed identity exists in the credential store
    ///
    /// Used for the development identity when authentication is disabled, so
    /// that pages created under it satisfy the owner foreign key. The row
    /// gets an empty hash, which never verifies, so nobody can log in as it.
    ///
    /// # Errors
    ///
    /// * `AuthError::Store` - Insert failed, or the id is still missing afterwards
    ///   because the email belongs to another user
    pub async fn ensure_identity(&self, user_id: &str, email: &str) -> AuthResult<()> {
        let user = User {
            id: user_id.to_string(),
            email: normalize_email(email),
            password_hash: String::new(),
            created_at: Utc::now(),
        };
        self.users.ensure_user(&user).await?;

        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(AuthError::Store(StoreError::Other(format!(
                "identity {user_id} could not be provisioned"
            ))));
        }
        Ok(())
    }

    /// Token codec shared with the authorization guard
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Session cookie settings
    pub fn cookie(&self) -> SessionCookie {
        self.cookie
    }

    fn issue_session(&self, user_id: UserId) -> IssuedSession {
        let now = Utc::now();
        let token = self.codec.issue_at(&user_id, self.session_duration, now);
        let set_cookie = self.cookie.issue(&token);

        IssuedSession {
            user_id,
            token,
            expires_at: now + self.session_duration,
            set_cookie,
        }
    }
}

/// Lower-case and trim an email address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM \n"), "alice@example.com");
        assert_eq!(normalize_email("   "), "");
    }
}
