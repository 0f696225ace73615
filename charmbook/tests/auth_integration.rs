//! Integration tests for authentication system.
//!
//! Tests registration, login, logout, the development identity and session
//! resolution against the in-memory store.

use charmbook::auth::{
    AuthError, AuthGuard, AuthMode, HashCost, PasscodeHasher, SessionCookie, SessionManager,
    TokenCodec, TokenError,
};
use charmbook::db::{MemoryStore, UserRepository};
use std::sync::Arc;

const SECRET: &str = "test_secret_key_for_sessions";

/// Helper to create a session manager over a fresh store
fn setup_sessions() -> (SessionManager, MemoryStore) {
    let store = MemoryStore::new();
    let hasher = PasscodeHasher::new(HashCost::testing()).expect("test hash cost is valid");
    let sessions = SessionManager::new(
        Arc::new(store.clone()),
        hasher,
        TokenCodec::new(SECRET).unwrap(),
        SessionCookie::new(true),
    );
    (sessions, store)
}

fn enforced_guard() -> AuthGuard {
    AuthGuard::new(AuthMode::Enforced, TokenCodec::new(SECRET).unwrap())
}

fn cookie_header(set_cookie: &str) -> String {
    set_cookie
        .split(';')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_register_new_user() {
    let (sessions, store) = setup_sessions();

    let session = sessions
        .register("alice@example.com", "SecurePass123!")
        .await
        .expect("Registration should succeed");

    assert!(!session.user_id.is_empty());
    assert!(session.set_cookie.starts_with("auth="));
    assert!(session.set_cookie.contains("HttpOnly"));
    assert!(session.set_cookie.contains("Secure"));
    assert_eq!(store.user_count().await, 1);

    let stored = store
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .expect("user should be stored");
    assert_ne!(stored.password_hash, "SecurePass123!");
    assert!(stored.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_register_issues_resolvable_session() {
    let (sessions, _store) = setup_sessions();

    let session = sessions.register("bob@example.com", "pw").await.unwrap();
    let identity = enforced_guard()
        .resolve(Some(&cookie_header(&session.set_cookie)))
        .unwrap();

    assert_eq!(identity.user_id, session.user_id);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (sessions, store) = setup_sessions();

    sessions
        .register("carol@example.com", "Password123!")
        .await
        .expect("First registration should succeed");

    let result = sessions
        .register("  Carol@Example.COM ", "Password456!")
        .await;

    assert!(
        matches!(result, Err(AuthError::EmailTaken)),
        "Should return EmailTaken error"
    );
    assert_eq!(store.user_count().await, 1);
}

#[tokio::test]
async fn test_register_rejects_empty_fields() {
    let (sessions, store) = setup_sessions();

    for (email, passcode) in [("", "pw"), ("   ", "pw"), ("dave@example.com", "")] {
        let result = sessions.register(email, passcode).await;
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }
    assert_eq!(store.user_count().await, 0);
}

#[tokio::test]
async fn test_login_success_with_normalized_email() {
    let (sessions, _store) = setup_sessions();
    let registered = sessions.register("erin@example.com", "hunter2").await.unwrap();

    let session = sessions.login(" ERIN@example.com", "hunter2").await.unwrap();

    assert_eq!(session.user_id, registered.user_id);
    let identity = enforced_guard()
        .resolve(Some(&cookie_header(&session.set_cookie)))
        .unwrap();
    assert_eq!(identity.user_id, registered.user_id);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (sessions, _store) = setup_sessions();
    sessions.register("frank@example.com", "right").await.unwrap();

    let wrong_passcode = sessions
        .login("frank@example.com", "wrong")
        .await
        .unwrap_err();
    let unknown_email = sessions
        .login("nobody@example.com", "right")
        .await
        .unwrap_err();

    assert!(matches!(wrong_passcode, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert_eq!(wrong_passcode.client_message(), unknown_email.client_message());
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (sessions, _store) = setup_sessions();

    let cleared = sessions.logout();

    assert!(cleared.starts_with("auth=;"));
    assert!(cleared.contains("Max-Age=-1"));
    assert_eq!(sessions.logout(), cleared);

    // A client that applied the clearing cookie sends an empty value
    let result = enforced_guard().resolve(Some(&cookie_header(&cleared)));
    assert!(matches!(result, Err(AuthError::MissingSession)));
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let (sessions, _store) = setup_sessions();
    let session = sessions.register("gina@example.com", "pw").await.unwrap();

    let other = AuthGuard::new(
        AuthMode::Enforced,
        TokenCodec::new("a-different-secret").unwrap(),
    );
    let result = other.resolve(Some(&cookie_header(&session.set_cookie)));

    assert!(matches!(
        result,
        Err(AuthError::Token(TokenError::SignatureMismatch))
    ));
}

#[tokio::test]
async fn test_ensure_identity_is_idempotent() {
    let (sessions, store) = setup_sessions();

    sessions.ensure_identity("dev-user", "dev@local").await.unwrap();
    sessions.ensure_identity("dev-user", "dev@local").await.unwrap();

    assert_eq!(store.user_count().await, 1);

    // The development identity has no passcode that could ever verify
    let result = sessions.login("dev@local", "").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[tokio::test]
async fn test_ensure_identity_fails_when_email_belongs_to_someone_else() {
    let (sessions, _store) = setup_sessions();
    sessions.register("dev@local", "pw").await.unwrap();

    let result = sessions.ensure_identity("dev-user", "dev@local").await;

    assert!(matches!(result, Err(AuthError::Store(_))));
}

#[tokio::test]
async fn test_disabled_mode_binds_every_request() {
    let guard = AuthGuard::new(
        AuthMode::Disabled {
            user_id: "dev-user".to_string(),
        },
        TokenCodec::new(SECRET).unwrap(),
    );

    assert_eq!(guard.resolve(None).unwrap().user_id, "dev-user");
    assert_eq!(
        guard.resolve(Some("auth=garbage")).unwrap().user_id,
        "dev-user"
    );

    let probe = guard.probe(None);
    assert_eq!(probe.user_id, "dev-user");
    assert!(probe.dev);
}
