//! Authentication API handlers.
//!
//! Registration and login answer `{"ok": true}` and set the `auth` session
//! cookie; logout clears it. The token never appears in a response body.
//!
//! # Examples
//!
//! Register a new user:
//! ```bash
//! curl -i -X POST http://localhost:8080/api/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "alice@example.com", "passcode": "hunter2"}'
//! ```
//!
//! Ask who you are:
//! ```bash
//! curl --cookie "auth=<token>" http://localhost:8080/api/me
//! ```

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header::SET_COOKIE},
    response::IntoResponse,
};
use charmbook::auth::{AuthError, Credentials, Probe};

use super::{Ack, AppState, error::ApiError, middleware::cookie_header};
use crate::{logging, metrics};

/// Register a new account and start a session for it.
///
/// # Request Body
///
/// ```json
/// { "email": "alice@example.com", "passcode": "hunter2" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body, or empty email or passcode
/// - `409 Conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(credentials) = payload.inspect_err(|_| metrics::registrations_total("invalid"))?;

    match state
        .sessions
        .register(&credentials.email, &credentials.passcode)
        .await
    {
        Ok(session) => {
            metrics::registrations_total("created");
            Ok(([(SET_COOKIE, session.set_cookie)], Ack::ok()))
        }
        Err(err) => {
            metrics::registrations_total(match err {
                AuthError::EmailTaken => "conflict",
                AuthError::Validation(_) => "invalid",
                _ => "error",
            });
            Err(err.into())
        }
    }
}

/// Log in with email and passcode.
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body
/// - `401 Unauthorized`: Unknown email or wrong passcode (same body for both)
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(credentials) = payload?;

    match state
        .sessions
        .login(&credentials.email, &credentials.passcode)
        .await
    {
        Ok(session) => {
            metrics::login_attempts_total(true);
            Ok(([(SET_COOKIE, session.set_cookie)], Ack::ok()))
        }
        Err(err) => {
            metrics::login_attempts_total(false);
            if matches!(err, AuthError::InvalidCredentials) {
                logging::log_security_event(
                    "failed_login",
                    None,
                    client_ip(&headers),
                    "Invalid credentials",
                );
            }
            Err(err.into())
        }
    }
}

/// Clear the session cookie.
///
/// Needs no session and always succeeds.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    ([(SET_COOKIE, state.sessions.logout())], Ack::ok())
}

/// Report the caller's identity without ever failing.
///
/// # Response
///
/// ```json
/// { "user_id": "" }                       // anonymous or invalid cookie
/// { "user_id": "6f1c..." }                // valid session
/// { "user_id": "dev-user", "dev": true }  // authentication disabled
/// ```
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Json<Probe> {
    let cookies = cookie_header(&headers);
    Json(state.guard.probe(cookies.as_deref()))
}

/// First address of `X-Forwarded-For`, when a proxy supplied one
fn client_ip(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
}
