//! Service configuration loaded from environment variables.

use std::fmt::Display;
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use tmf683_event_bus::EventBusConfig;

use crate::error::AppError;

/// Top-level service configuration.
///
/// Loaded once at startup via [`ServiceConfig::from_env`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Host to bind the HTTP server to.
    pub host: String,

    /// Port to bind the HTTP server to.
    pub port: u16,

    /// PostgreSQL connection string. `None` runs on in-memory stores.
    pub database_url: Option<String>,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Event bus history capacity and handler timeout.
    pub event_bus: EventBusConfig,

    /// How long shutdown waits for in-flight event dispatches.
    pub shutdown_grace: Duration,

    /// OTLP gRPC endpoint. Trace export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl ServiceConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var(&var, "PORT", 3000_u16)?;
        let database_url = var("DATABASE_URL");
        let database_max_connections = parse_var(&var, "DATABASE_MAX_CONNECTIONS", 10_u32)?;

        let history_capacity = NonZeroUsize::new(parse_var(&var, "EVENT_HISTORY_CAPACITY", 1000)?)
            .ok_or_else(|| {
                AppError::Config("EVENT_HISTORY_CAPACITY must be greater than zero".to_string())
            })?;
        let mut event_bus = EventBusConfig::default().with_history_capacity(history_capacity);
        if let Some(raw) = var("EVENT_HANDLER_TIMEOUT_MS") {
            let millis: u64 = parse_value("EVENT_HANDLER_TIMEOUT_MS", &raw)?;
            if millis == 0 {
                return Err(AppError::Config(
                    "EVENT_HANDLER_TIMEOUT_MS must be greater than zero".to_string(),
                ));
            }
            event_bus = event_bus.with_handler_timeout(Duration::from_millis(millis));
        }

        let shutdown_grace = Duration::from_millis(parse_var(&var, "SHUTDOWN_GRACE_MS", 5000)?);
        let otlp_endpoint = var("OTEL_EXPORTER_OTLP_ENDPOINT");

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            event_bus,
            shutdown_grace,
            otlp_endpoint,
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_var<T>(var: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("{key} has invalid value {raw:?}: {e}")))
}
