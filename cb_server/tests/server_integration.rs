//! Integration tests for the HTTP server.
//!
//! Drives the full router (middleware included) against the in-memory store:
//! cookie sessions, ownership scoping, public reads and the development mode.

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use cb_server::api::{AppState, Repositories, create_router};
use charmbook::auth::{AuthMode, HashCost, PasscodeHasher, SessionCookie, TokenCodec};
use charmbook::db::MemoryStore;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt; // For `oneshot` method

const SECRET: &str = "test_secret_key_for_testing_only";

/// Helper to create a test server over a fresh in-memory store
fn create_test_server(mode: AuthMode) -> (axum::Router, AppState) {
    let state = AppState::new(
        Repositories::in_memory(&MemoryStore::new()),
        PasscodeHasher::new(HashCost::testing()).expect("test hash cost is valid"),
        TokenCodec::new(SECRET).unwrap(),
        SessionCookie::new(true),
        mode,
    );
    let app = create_router(state.clone(), Duration::from_secs(30));
    (app, state)
}

fn enforced_server() -> axum::Router {
    create_test_server(AuthMode::Enforced).0
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestResponse {
    /// `name=value` part of the response's `Set-Cookie`, as a browser would send it back
    fn cookie(&self) -> String {
        self.set_cookie()
            .split(';')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    fn set_cookie(&self) -> &str {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Register a user and return the cookie to send on later requests
async fn register(app: &axum::Router, email: &str) -> String {
    let response = send(
        app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"email": email, "passcode": "hunter2"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    response.cookie()
}

async fn create_page(app: &axum::Router, cookie: &str, title: &str, is_public: bool) -> String {
    let response = send(
        app,
        Method::POST,
        "/api/pages",
        Some(cookie),
        Some(json!({"title": title, "note": "", "is_public": is_public})),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    response.body["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = enforced_server();

    let response = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
    assert_eq!(response.body["database"], true);
}

#[tokio::test]
async fn test_request_id_echoed() {
    let app = enforced_server();

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-42")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "trace-me-42"
    );
}

#[tokio::test]
async fn test_unknown_api_path_is_404() {
    let app = enforced_server();

    let response = send(&app, Method::GET, "/api/nothing/here", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({"error": "not found"}));
}

// ============================================================================
// Session Tests
// ============================================================================

#[tokio::test]
async fn test_register_sets_session_cookie() {
    let app = enforced_server();

    let response = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"email": "alice@example.com", "passcode": "hunter2"})),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"ok": true}));
    let set_cookie = response.set_cookie();
    assert!(set_cookie.starts_with("auth="));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=2592000"));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Secure"));

    let me = send(&app, Method::GET, "/api/me", Some(&response.cookie()), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert!(!me.body["user_id"].as_str().unwrap().is_empty());
    assert!(me.body.get("dev").is_none());

    let pages = send(&app, Method::GET, "/api/pages", Some(&response.cookie()), None).await;
    assert_eq!(pages.status, StatusCode::OK);
    assert_eq!(pages.body, json!([]));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = enforced_server();
    register(&app, "bob@example.com").await;

    let response = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"email": "BOB@example.com ", "passcode": "other"})),
    )
    .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body, json!({"error": "email already registered"}));
    assert!(response.headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_register_validation() {
    let app = enforced_server();

    let empty = send(
        &app,
        Method::POST,
        "/api/register",
        None,
        Some(json!({"email": "", "passcode": "x"})),
    )
    .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"error": "bad json"}));
}

#[tokio::test]
async fn test_login_failures_look_the_same() {
    let app = enforced_server();
    register(&app, "carol@example.com").await;

    let wrong_passcode = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "carol@example.com", "passcode": "wrong"})),
    )
    .await;
    let unknown_email = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "nobody@example.com", "passcode": "hunter2"})),
    )
    .await;

    assert_eq!(wrong_passcode.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_passcode.body, unknown_email.body);
    assert_eq!(wrong_passcode.body, json!({"error": "invalid credentials"}));
}

#[tokio::test]
async fn test_login_issues_working_cookie() {
    let app = enforced_server();
    register(&app, "dave@example.com").await;

    let response = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "dave@example.com", "passcode": "hunter2"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let page_id = create_page(&app, &response.cookie(), "after login", false).await;
    assert!(!page_id.is_empty());
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = enforced_server();

    for _ in 0..2 {
        let response = send(&app, Method::POST, "/api/logout", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, json!({"ok": true}));
        let set_cookie = response.set_cookie();
        assert!(set_cookie.starts_with("auth=;"));
        assert!(set_cookie.contains("Max-Age=-1"));
    }
}

#[tokio::test]
async fn test_protected_routes_require_session() {
    let app = enforced_server();
    let cookie = register(&app, "erin@example.com").await;

    let missing = send(&app, Method::GET, "/api/pages", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body, json!({"error": "auth required"}));

    // Flip the last character of the signature
    let mut tampered = cookie.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });
    let rejected = send(&app, Method::GET, "/api/pages", Some(&tampered), None).await;
    assert_eq!(rejected.status, StatusCode::UNAUTHORIZED);
    assert_eq!(rejected.body, missing.body);

    let foreign_secret = TokenCodec::new("some-other-secret")
        .unwrap()
        .issue("erin", charmbook::auth::session_ttl());
    let forged = send(
        &app,
        Method::GET,
        "/api/pages",
        Some(&format!("auth={foreign_secret}")),
        None,
    )
    .await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_is_anonymous_without_session() {
    let app = enforced_server();

    let response = send(&app, Method::GET, "/api/me", Some("auth=garbage"), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({"user_id": ""}));
}

// ============================================================================
// Ownership Tests
// ============================================================================

#[tokio::test]
async fn test_foreign_page_is_indistinguishable_from_absent() {
    let app = enforced_server();
    let alice = register(&app, "alice@example.com").await;
    let mallory = register(&app, "mallory@example.com").await;
    let page_id = create_page(&app, &alice, "diary", false).await;

    let foreign = send(&app, Method::GET, &format!("/api/pages/{page_id}"), Some(&mallory), None).await;
    let absent = send(&app, Method::GET, "/api/pages/does-not-exist", Some(&mallory), None).await;

    assert_eq!(foreign.status, StatusCode::NOT_FOUND);
    assert_eq!(absent.status, StatusCode::NOT_FOUND);
    assert_eq!(foreign.body, absent.body);

    let update = send(
        &app,
        Method::PUT,
        &format!("/api/pages/{page_id}"),
        Some(&mallory),
        Some(json!({"title": "pwned", "note": "", "is_public": true})),
    )
    .await;
    let delete = send(&app, Method::DELETE, &format!("/api/pages/{page_id}"), Some(&mallory), None).await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let own = send(&app, Method::GET, &format!("/api/pages/{page_id}"), Some(&alice), None).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["title"], "diary");
    assert_eq!(own.body["is_public"], false);
}

#[tokio::test]
async fn test_page_update_and_delete() {
    let app = enforced_server();
    let alice = register(&app, "alice@example.com").await;
    let page_id = create_page(&app, &alice, "draft", false).await;
    let uri = format!("/api/pages/{page_id}");

    let update = send(
        &app,
        Method::PUT,
        &uri,
        Some(&alice),
        Some(json!({"title": "final", "note": "done", "is_public": true})),
    )
    .await;
    assert_eq!(update.status, StatusCode::OK);
    assert_eq!(update.body, json!({"ok": true}));

    let fetched = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(fetched.body["note"], "done");

    let delete = send(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(delete.status, StatusCode::OK);

    let gone = send(&app, Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_page_read() {
    let app = enforced_server();
    let alice = register(&app, "alice@example.com").await;
    let public = create_page(&app, &alice, "gallery", true).await;
    let private = create_page(&app, &alice, "diary", false).await;

    let open = send(&app, Method::GET, &format!("/api/public/pages/{public}"), None, None).await;
    assert_eq!(open.status, StatusCode::OK);
    assert_eq!(open.body["title"], "gallery");

    let closed = send(&app, Method::GET, &format!("/api/public/pages/{private}"), None, None).await;
    assert_eq!(closed.status, StatusCode::FORBIDDEN);
    assert_eq!(closed.body, json!({"error": "private"}));

    let missing = send(&app, Method::GET, "/api/public/pages/nope", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_charm_lifecycle() {
    let app = enforced_server();
    let alice = register(&app, "alice@example.com").await;
    let page_id = create_page(&app, &alice, "charms", false).await;
    let charms_uri = format!("/api/pages/{page_id}/charms");

    let created = send(
        &app,
        Method::POST,
        &charms_uri,
        Some(&alice),
        Some(json!({"shape": "heart", "color": "darkgray", "title": "t", "text_value": "v"})),
    )
    .await;
    assert_eq!(created.status, StatusCode::OK);
    let charm_id = created.body["id"].as_str().unwrap().to_string();

    let updated = send(
        &app,
        Method::PUT,
        &format!("/api/charms/{charm_id}"),
        Some(&alice),
        Some(json!({"color": "gold"})),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);

    let listed = send(&app, Method::GET, &charms_uri, Some(&alice), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body[0]["shape"], "heart");
    assert_eq!(listed.body[0]["color"], "gold");
    assert_eq!(listed.body[0]["text_value"], "v");
    assert_eq!(listed.body[0]["page_id"], page_id.as_str());

    let deleted = send(&app, Method::DELETE, &format!("/api/charms/{charm_id}"), Some(&alice), None).await;
    assert_eq!(deleted.status, StatusCode::OK);

    let empty = send(&app, Method::GET, &charms_uri, Some(&alice), None).await;
    assert_eq!(empty.body, json!([]));
}

#[tokio::test]
async fn test_charm_validation() {
    let app = enforced_server();
    let alice = register(&app, "alice@example.com").await;
    let page_id = create_page(&app, &alice, "charms", false).await;
    let charms_uri = format!("/api/pages/{page_id}/charms");

    let bad_shape = send(
        &app,
        Method::POST,
        &charms_uri,
        Some(&alice),
        Some(json!({"shape": "octagon", "color": "red"})),
    )
    .await;
    let long_text = send(
        &app,
        Method::POST,
        &charms_uri,
        Some(&alice),
        Some(json!({"shape": "star", "color": "red", "text_value": "x".repeat(257)})),
    )
    .await;

    assert_eq!(bad_shape.status, StatusCode::BAD_REQUEST);
    assert_eq!(long_text.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_owner_cannot_modify_charm() {
    let app = enforced_server();
    let alice = register(&app, "alice@example.com").await;
    let mallory = register(&app, "mallory@example.com").await;
    let page_id = create_page(&app, &alice, "charms", false).await;
    let created = send(
        &app,
        Method::POST,
        &format!("/api/pages/{page_id}/charms"),
        Some(&alice),
        Some(json!({"shape": "star", "color": "blue", "title": "mine"})),
    )
    .await;
    let charm_id = created.body["id"].as_str().unwrap().to_string();

    let update = send(
        &app,
        Method::PUT,
        &format!("/api/charms/{charm_id}"),
        Some(&mallory),
        Some(json!({"title": "stolen"})),
    )
    .await;
    let delete = send(&app, Method::DELETE, &format!("/api/charms/{charm_id}"), Some(&mallory), None).await;
    let list = send(
        &app,
        Method::GET,
        &format!("/api/pages/{page_id}/charms"),
        Some(&mallory),
        None,
    )
    .await;
    let create = send(
        &app,
        Method::POST,
        &format!("/api/pages/{page_id}/charms"),
        Some(&mallory),
        Some(json!({"shape": "star", "color": "red"})),
    )
    .await;

    assert_eq!(update.status, StatusCode::NOT_FOUND);
    assert_eq!(delete.status, StatusCode::NOT_FOUND);
    assert_eq!(list.status, StatusCode::NOT_FOUND);
    assert_eq!(create.status, StatusCode::NOT_FOUND);

    let listed = send(
        &app,
        Method::GET,
        &format!("/api/pages/{page_id}/charms"),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(listed.body[0]["title"], "mine");
}

// ============================================================================
// Development Mode Tests
// ============================================================================

#[tokio::test]
async fn test_disabled_auth_binds_dev_identity() {
    let (app, state) = create_test_server(AuthMode::Disabled {
        user_id: "dev-user".to_string(),
    });
    state
        .sessions
        .ensure_identity("dev-user", "dev@local")
        .await
        .unwrap();

    let me = send(&app, Method::GET, "/api/me", None, None).await;
    assert_eq!(me.body, json!({"user_id": "dev-user", "dev": true}));

    let page_id = create_page(&app, "", "dev page", false).await;
    let fetched = send(&app, Method::GET, &format!("/api/pages/{page_id}"), None, None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["owner_id"], "dev-user");
}
