//! Authorization guard resolving the caller's identity per request.

use super::{
    cookie::{SESSION_COOKIE, read_cookie},
    errors::{AuthError, AuthResult},
    models::{Identity, Probe, UserId},
    token::TokenCodec,
};

/// How requests are authenticated, chosen once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Every protected request must present a valid session cookie
    Enforced,
    /// Development only: every request is bound to `user_id` without any check
    Disabled { user_id: UserId },
}

/// Resolves identities from `Cookie` headers
#[derive(Debug, Clone)]
pub struct AuthGuard {
    mode: AuthMode,
    codec: TokenCodec,
}

impl AuthGuard {
    pub fn new(mode: AuthMode, codec: TokenCodec) -> Self {
        Self { mode, codec }
    }

    pub fn mode(&self) -> &AuthMode {
        &self.mode
    }

    /// Resolve the identity behind a request's `Cookie` header
    ///
    /// # Errors
    ///
    /// * `AuthError::MissingSession` - No session cookie
    /// * `AuthError::Token` - Cookie present but the token is rejected
    pub fn resolve(&self, cookie_header: Option<&str>) -> AuthResult<Identity> {
        match &self.mode {
            AuthMode::Disabled { user_id } => Ok(Identity::new(user_id.clone())),
            AuthMode::Enforced => {
                let token = cookie_header
                    .and_then(|header| read_cookie(header, SESSION_COOKIE))
                    .ok_or(AuthError::MissingSession)?;
                let claims = self.codec.validate(token)?;
                Ok(Identity::new(claims.user_id))
            }
        }
    }

    /// Report who the caller is without ever failing
    pub fn probe(&self, cookie_header: Option<&str>) -> Probe {
        match &self.mode {
            AuthMode::Disabled { user_id } => Probe {
                user_id: user_id.clone(),
                dev: true,
            },
            AuthMode::Enforced => match self.resolve(cookie_header) {
                Ok(identity) => Probe {
                    user_id: identity.user_id,
                    dev: false,
                },
                Err(_) => Probe::anonymous(),
            },
        }
    }
}
