//! Charmbook HTTP server.
//!
//! Serves the pages and charms API over PostgreSQL with cookie sessions.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Error};
use cb_server::{
    api::{self, AppState, Repositories},
    config::ServerConfig,
    logging, metrics,
};
use charmbook::{
    AuthMode,
    auth::{HashCost, PasscodeHasher, SessionCookie, TokenCodec},
    db::Database,
};
use pico_args::Arguments;

const HELP: &str = "\
Run the charmbook server

USAGE:
  cb_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/charmbook]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  TOKEN_SECRET             Session token signing secret (required)
  COOKIE_SECURE            Mark the session cookie Secure [default: true]
  AUTH_DISABLED            Development only: act as DEV_USER_ID on every request
  DEV_USER_ID              Development identity id [default: dev-user]
  DEV_USER_EMAIL           Development identity email [default: dev@local]
  PASSWORD_HASH_COST       Argon2 passes per hash [default: 2]
  REQUEST_TIMEOUT_SECS     Per-request deadline [default: 30]
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  RUST_LOG                 Log filter [default: info,sqlx=warn,hyper=warn]
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url_override: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, database_url_override)?;
    config.validate()?;

    if config.security.auth_disabled {
        tracing::warn!(
            dev_user_id = %config.dev_user.user_id,
            "Authentication DISABLED: every request acts as the development identity"
        );
    }
    if !config.security.cookie_secure {
        tracing::warn!("Session cookies are not marked Secure");
    }

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        tracing::info!(%addr, "Prometheus exporter listening");
    }

    tracing::info!("Connecting to database");
    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected successfully");

    let mode = if config.security.auth_disabled {
        AuthMode::Disabled {
            user_id: config.dev_user.user_id.clone(),
        }
    } else {
        AuthMode::Enforced
    };

    let state = AppState::new(
        Repositories::postgres(&db),
        PasscodeHasher::new(HashCost::with_iterations(config.security.password_hash_cost))?,
        TokenCodec::new(config.security.token_secret.as_bytes())?,
        SessionCookie::new(config.security.cookie_secure),
        mode,
    );

    if config.security.auth_disabled {
        state
            .sessions
            .ensure_identity(&config.dev_user.user_id, &config.dev_user.email)
            .await
            .context("Failed to provision the development identity")?;
    }

    let app = api::create_router(state, Duration::from_secs(config.request_timeout_secs));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    tracing::info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C signal handler");
        std::future::pending::<()>().await;
    }
}
