//! Compact HMAC-signed session tokens.
//!
//! A token is `payload.signature`, both segments URL-safe base64 without
//! padding. `payload` encodes the JSON claims `{"uid", "exp"}`; `signature`
//! is HMAC-SHA256 over the payload segment bytes under the server secret.
//!
//! Validation order matters: the signature is checked before the payload is
//! decoded, and expiry only after that. A token is expired once `now` is
//! strictly after `exp`; no clock-skew allowance is applied.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::{AuthError, AuthResult, TokenError};
use super::models::TokenClaims;

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of a session token in seconds (30 days)
pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 30;

/// Lifetime of a session token
pub fn session_ttl() -> Duration {
    Duration::seconds(SESSION_TTL_SECS)
}

/// Issues and validates session tokens under one server secret
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidSecret` - Secret is empty
    pub fn new(secret: impl Into<Vec<u8>>) -> AuthResult<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret("secret must not be empty".to_string()));
        }
        Ok(Self { secret })
    }

    /// Issue a token for `user_id` expiring `ttl` from now
    pub fn issue(&self, user_id: &str, ttl: Duration) -> String {
        self.issue_at(user_id, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, user_id: &str, ttl: Duration, now: DateTime<Utc>) -> String {
        let claims = TokenClaims {
            user_id: user_id.to_string(),
            expires_at: now + ttl,
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims
    pub fn sign(&self, claims: &TokenClaims) -> String {
        // serializing two plain fields cannot fail
        let json = serde_json::to_vec(claims).unwrap_or_default();
        let payload = URL_SAFE_NO_PAD.encode(json);
        let signature = self.signature(&payload);
        format!("{payload}.{signature}")
    }

    /// Validate a token against the current time
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let mut segments = token.split('.');
        let (Some(payload), Some(signature), None) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(TokenError::Malformed);
        };

        let expected = self.signature(payload);
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(TokenError::SignatureMismatch);
        }

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Decode)?;
        let claims: TokenClaims = serde_json::from_slice(&json).map_err(|_| TokenError::Decode)?;

        if now > claims.expires_at {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn signature(&self, payload: &str) -> String {
        // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("HMAC-SHA256 takes keys of any size"));
        mac.update(payload.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}
