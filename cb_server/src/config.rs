//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use charmbook::db::DatabaseConfig;
use std::net::SocketAddr;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Security configuration
    pub security: SecurityConfig,
    /// Development identity used when authentication is disabled
    pub dev_user: DevUserConfig,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Prometheus scrape endpoint, if any
    pub metrics_bind: Option<SocketAddr>,
}

/// Security-related configuration
#[derive(Clone)]
pub struct SecurityConfig {
    /// Token signing secret (required)
    pub token_secret: String,
    /// Whether session cookies carry the `Secure` attribute
    pub cookie_secure: bool,
    /// Skip authentication and bind every request to the development identity
    pub auth_disabled: bool,
    /// Argon2 passes per hash
    pub password_hash_cost: u32,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("token_secret", &"<redacted>")
            .field("cookie_secure", &self.cookie_secure)
            .field("auth_disabled", &self.auth_disabled)
            .field("password_hash_cost", &self.password_hash_cost)
            .finish()
    }
}

/// Development identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevUserConfig {
    pub user_id: String,
    pub email: String,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(bind_override, database_url_override, |key| {
            std::env::var(key).ok()
        })
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_or(&lookup, "SERVER_BIND", default_bind())?,
        };

        let defaults = DatabaseConfig::development();
        let database = DatabaseConfig {
            database_url: database_url_override
                .or_else(|| lookup("DATABASE_URL"))
                .unwrap_or(defaults.database_url),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,
            min_connections: parse_or(&lookup, "DB_MIN_CONNECTIONS", defaults.min_connections)?,
            connection_timeout_secs: parse_or(
                &lookup,
                "DB_CONNECTION_TIMEOUT_SECS",
                defaults.connection_timeout_secs,
            )?,
            idle_timeout_secs: parse_or(&lookup, "DB_IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs)?,
            max_lifetime_secs: parse_or(&lookup, "DB_MAX_LIFETIME_SECS", defaults.max_lifetime_secs)?,
        };

        // Security configuration (REQUIRED)
        let token_secret = lookup("TOKEN_SECRET")
            .or_else(|| lookup("JWT_SECRET"))
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "TOKEN_SECRET".to_string(),
                hint: "Generate with: openssl rand -hex 32".to_string(),
            })?;

        let security = SecurityConfig {
            token_secret,
            cookie_secure: bool_or(&lookup, "COOKIE_SECURE", true),
            auth_disabled: bool_or(&lookup, "AUTH_DISABLED", false),
            password_hash_cost: parse_or(&lookup, "PASSWORD_HASH_COST", 2)?,
        };

        let dev_user = DevUserConfig {
            user_id: lookup("DEV_USER_ID").unwrap_or_else(|| "dev-user".to_string()),
            email: lookup("DEV_USER_EMAIL").unwrap_or_else(|| "dev@local".to_string()),
        };

        let metrics_bind = match lookup("METRICS_BIND") {
            Some(raw) if !raw.is_empty() => Some(raw.parse().map_err(|_| ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("'{raw}' is not an IP:PORT address"),
            })?),
            _ => None,
        };

        Ok(ServerConfig {
            bind,
            database,
            security,
            dev_user,
            request_timeout_secs: parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.token_secret.is_empty() {
            return Err(ConfigError::Invalid {
                var: "TOKEN_SECRET".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.security.password_hash_cost == 0 {
            return Err(ConfigError::Invalid {
                var: "PASSWORD_HASH_COST".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "REQUEST_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.security.auth_disabled && self.dev_user.user_id.is_empty() {
            return Err(ConfigError::Invalid {
                var: "DEV_USER_ID".to_string(),
                reason: "Must not be empty when AUTH_DISABLED is set".to_string(),
            });
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: format!(
                    "Cannot exceed DB_MAX_CONNECTIONS ({})",
                    self.database.max_connections
                ),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

/// Parse a variable, falling back to `default` when it is unset
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("could not parse '{raw}'"),
        }),
        None => Ok(default),
    }
}

/// Read a boolean flag; `1`, `true`, `TRUE` and `yes` enable it
fn bool_or<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map_or(default, |raw| parse_flag(&raw))
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "1" | "true" | "TRUE" | "yes")
}
