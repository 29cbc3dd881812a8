use std::{env, time::Duration};

use thiserror::Error;

/// AppConfig
///
/// Holds the service configuration. Loaded once at startup and immutable afterwards;
/// handlers and middleware pull it out of the shared `AppState` via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log output format.
    pub env: Env,
    // Connection string. The scheme picks the backend (`sqlite:` or Postgres).
    pub db_url: String,
    pub db_max_connections: u32,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // Upper bound for a single store call issued by the HTTP layer.
    pub store_timeout: Duration,
    // When set, error bodies carry a `stack` field with the full error chain.
    pub expose_error_stack: bool,
    // When set, the repository is wrapped in the query-logging decorator.
    pub log_queries: bool,
}

/// Env
///
/// Runtime context. Local gets human-readable logs, Production gets JSON logs.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// ConfigError
///
/// Raised by `AppConfig::load` when a required variable is missing or a value
/// cannot be parsed. The binary refuses to start on either.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),
    #[error("environment variable {var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 5_000;

impl Default for AppConfig {
    /// Safe values for test scaffolding: an in-memory SQLite URL and every
    /// diagnostic switch turned off.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: "sqlite::memory:".to_string(),
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            expose_error_stack: false,
            log_queries: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables. `DATABASE_URL` is
    /// mandatory in every environment; everything else has a default.
    ///
    /// # Errors
    /// Returns `ConfigError::Missing` when `DATABASE_URL` is unset and
    /// `ConfigError::Invalid` when a numeric or boolean variable does not parse.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let db_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let db_max_connections =
            parse_var("DB_MAX_CONNECTIONS")?.unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let timeout_ms = parse_var("STORE_TIMEOUT_MS")?.unwrap_or(DEFAULT_STORE_TIMEOUT_MS);

        Ok(Self {
            env,
            db_url,
            db_max_connections,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            store_timeout: Duration::from_millis(timeout_ms),
            expose_error_stack: flag_var("EXPOSE_ERROR_STACK")?,
            log_queries: flag_var("LOG_QUERIES")?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(None),
    }
}

// Unset means off.
fn flag_var(var: &'static str) -> Result<bool, ConfigError> {
    match env::var(var) {
        Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            _ => Err(ConfigError::Invalid { var, value }),
        },
        Err(_) => Ok(false),
    }
}
