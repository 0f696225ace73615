//! HTTP API for charmbook.
//!
//! # Modules
//!
//! - [`auth`]: Registration, login, logout and the identity probe
//! - [`pages`]: Owner-scoped pages and the public page read
//! - [`charms`]: Owner-scoped charms
//! - [`middleware`]: Cookie session guard for protected endpoints
//! - [`request_id`]: Request correlation ids
//! - [`error`]: Error to response mapping
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                    - Health check (public)
//! POST   /api/register              - Register and start a session (public)
//! POST   /api/login                 - Log in (public)
//! POST   /api/logout                - Clear the session cookie (public)
//! GET    /api/me                    - Who am I (public, never fails)
//! GET    /api/public/pages/{id}     - Read a public page (public)
//! GET    /api/pages                 - List my pages
//! POST   /api/pages                 - Create a page
//! GET    /api/pages/{id}            - Read one of my pages
//! PUT    /api/pages/{id}            - Replace one of my pages
//! DELETE /api/pages/{id}            - Delete one of my pages and its charms
//! GET    /api/pages/{id}/charms     - List charms of one of my pages
//! POST   /api/pages/{id}/charms     - Add a charm to one of my pages
//! PUT    /api/charms/{id}           - Update one of my charms
//! DELETE /api/charms/{id}           - Delete one of my charms
//! ```
//!
//! Protected endpoints read the `auth` session cookie; when authentication is
//! disabled they all act as the development identity.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use cb_server::api::{AppState, Repositories, create_router};
//! use charmbook::auth::{AuthMode, HashCost, PasscodeHasher, SessionCookie, TokenCodec};
//! use charmbook::db::MemoryStore;
//! use std::time::Duration;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let state = AppState::new(
//!     Repositories::in_memory(&MemoryStore::new()),
//!     PasscodeHasher::new(HashCost::default())?,
//!     TokenCodec::new("change-me")?,
//!     SessionCookie::new(true),
//!     AuthMode::Enforced,
//! );
//!
//! let app = create_router(state, Duration::from_secs(30));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod charms;
pub mod error;
pub mod middleware;
pub mod pages;
pub mod request_id;

pub use error::{ApiError, ErrorResponse};

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use charmbook::{
    AuthGuard, AuthMode, CharmManager, PageManager, SessionManager,
    auth::{PasscodeHasher, SessionCookie, TokenCodec},
    db::{
        CharmRepository, Database, MemoryStore, PageRepository, PgCharmRepository,
        PgPageRepository, PgUserRepository, UserRepository,
    },
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer};

/// Storage behind the application
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub pages: Arc<dyn PageRepository>,
    pub charms: Arc<dyn CharmRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(db: &Database) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(db.pool().clone())),
            pages: Arc::new(PgPageRepository::new(db.pool().clone())),
            charms: Arc::new(PgCharmRepository::new(db.pool().clone())),
        }
    }

    /// Repositories over a shared in-memory store
    pub fn in_memory(store: &MemoryStore) -> Self {
        Self {
            users: Arc::new(store.clone()),
            pages: Arc::new(store.clone()),
            charms: Arc::new(store.clone()),
        }
    }
}

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request (cheap due to Arc wrappers).
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub guard: Arc<AuthGuard>,
    pub pages: Arc<PageManager>,
    pub charms: Arc<CharmManager>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Wire the managers together
    ///
    /// The session manager and the guard share `codec`, so tokens issued at
    /// login are the ones the guard accepts.
    pub fn new(
        repos: Repositories,
        hasher: PasscodeHasher,
        codec: TokenCodec,
        cookie: SessionCookie,
        mode: AuthMode,
    ) -> Self {
        let guard = AuthGuard::new(mode, codec.clone());
        let sessions = SessionManager::new(repos.users.clone(), hasher, codec, cookie);

        Self {
            sessions: Arc::new(sessions),
            guard: Arc::new(guard),
            pages: Arc::new(PageManager::new(repos.pages.clone())),
            charms: Arc::new(CharmManager::new(repos.pages, repos.charms)),
            users: repos.users,
        }
    }
}

/// Body of create responses
#[derive(Debug, Serialize)]
pub struct Created {
    pub id: String,
}

/// Body of successful mutations without a payload
#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Json<Self> {
        Json(Self { ok: true })
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Arguments
///
/// - `state`: Application state with managers
/// - `request_timeout`: Deadline for each request; late requests get `408`
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_router(state.clone()))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_router(state: AppState) -> Router<AppState> {
    // Public routes (no authentication middleware)
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/public/pages/{id}", get(pages::get_public_page));

    // Protected routes; `route_layer` keeps unknown paths out of the guard
    let protected_routes = Router::new()
        .route("/pages", get(pages::list_pages).post(pages::create_page))
        .route(
            "/pages/{id}",
            get(pages::get_page)
                .put(pages::update_page)
                .delete(pages::delete_page),
        )
        .route(
            "/pages/{id}/charms",
            get(charms::list_charms).post(charms::create_charm),
        )
        .route(
            "/charms/{id}",
            put(charms::update_charm).delete(charms::delete_charm),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(api_not_found)
}

async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "not found".to_string(),
        }),
    )
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","database":true,"version":"0.1.0","timestamp":"2026-10-19T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = state.users.health_check().await.is_ok();

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
