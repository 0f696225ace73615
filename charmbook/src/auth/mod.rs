//! Authentication module providing credential checks and stateless sessions.
//!
//! This module implements:
//! - Argon2id passcode hashing with a tunable cost
//! - Compact HMAC-SHA256 session tokens (30-day expiry), never stored server-side
//! - An HTTP-only `auth` session cookie whose `Secure` flag is set per deployment
//! - A guard that resolves the caller's identity, or binds every request to a
//!   fixed development identity when authentication is disabled
//!
//! ## Example
//!
//! ```no_run
//! use charmbook::auth::{
//!     AuthGuard, AuthMode, HashCost, PasscodeHasher, SessionCookie, SessionManager, TokenCodec,
//! };
//! use charmbook::db::{Database, PgUserRepository};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let codec = TokenCodec::new("server-secret")?;
//!     let sessions = SessionManager::new(
//!         Arc::new(PgUserRepository::new(db.pool().clone())),
//!         PasscodeHasher::new(HashCost::default())?,
//!         codec.clone(),
//!         SessionCookie::new(true),
//!     );
//!
//!     let session = sessions.register("player@example.com", "hunter2").await?;
//!     let guard = AuthGuard::new(AuthMode::Enforced, codec);
//!     let identity = guard.resolve(Some(&format!("auth={}", session.token)))?;
//!     assert_eq!(identity.user_id, session.user_id);
//!     Ok(())
//! }
//! ```

pub mod cookie;
pub mod errors;
pub mod guard;
pub mod manager;
pub mod models;
pub mod password;
pub mod token;

pub use cookie::{SESSION_COOKIE, SessionCookie, read_cookie};
pub use errors::{AuthError, AuthResult, TokenError};
pub use guard::{AuthGuard, AuthMode};
pub use manager::{SessionManager, normalize_email};
pub use models::{Credentials, Identity, IssuedSession, Probe, TokenClaims, User, UserId};
pub use password::{HashCost, PasscodeHasher};
pub use token::{SESSION_TTL_SECS, TokenCodec, session_ttl};
