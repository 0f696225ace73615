//! Authentication middleware for protected endpoints.
//!
//! Resolves the caller from the `auth` session cookie and injects the
//! resulting [`Identity`] into request extensions for downstream handlers.
//!
//! # Extracting the Identity
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use charmbook::auth::Identity;
//!
//! async fn protected_handler(Extension(caller): Extension<Identity>) -> String {
//!     format!("Authenticated as user {}", caller.user_id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::COOKIE},
    middleware::Next,
    response::Response,
};
use charmbook::auth::{AuthError, TokenError};

use super::{AppState, error::ApiError};
use crate::{logging, metrics};

/// Authentication middleware that validates the session cookie and injects the identity.
///
/// # Behavior
///
/// - **Success**: Cookie valid → Injects `Identity` into request extensions → Calls next handler
/// - **Missing cookie**: Returns `401 Unauthorized`
/// - **Tampered/expired token**: Returns `401 Unauthorized` with the same body
/// - **Authentication disabled**: Always injects the development identity
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cookies = cookie_header(request.headers());

    match state.guard.resolve(cookies.as_deref()) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        Err(err) => {
            let reason = rejection_reason(&err);
            metrics::auth_rejections_total(reason);
            if let AuthError::Token(token_err) = &err {
                logging::log_security_event(
                    "token_rejected",
                    None,
                    None,
                    &format!("{} {}: {}", request.method(), request.uri().path(), token_err),
                );
            }
            Err(err.into())
        }
    }
}

/// All `Cookie` headers of a request joined into one
///
/// HTTP/2 clients may split cookies over several header lines.
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let joined = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    (!joined.is_empty()).then_some(joined)
}

fn rejection_reason(err: &AuthError) -> &'static str {
    match err {
        AuthError::MissingSession => "missing",
        AuthError::Token(TokenError::Malformed) => "malformed",
        AuthError::Token(TokenError::SignatureMismatch) => "signature",
        AuthError::Token(TokenError::Decode) => "decode",
        AuthError::Token(TokenError::Expired) => "expired",
        _ => "other",
    }
}
