use std::str::FromStr;

use once_cell::sync::Lazy;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// Address the HTTP server should bind to. Defaults to `0.0.0.0`.
pub static BIND_ADDRESS: Lazy<String> =
    Lazy::new(|| read_optional_env("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()));

/// Port the HTTP server should listen on (`SERVER_PORT`). Defaults to `8080`.
pub static SERVER_PORT: Lazy<u16> = Lazy::new(|| {
    std::env::var("SERVER_PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(8080)
});

/// Log level used when `RUST_LOG` is not set. Defaults to `info`.
pub static LOG_LEVEL: Lazy<String> =
    Lazy::new(|| read_optional_env("LOG_LEVEL").unwrap_or_else(|| "info".to_string()));

/// When set to a truthy value, allows the application to continue running even if database
/// migrations fail. Defaults to `false`.
pub static ALLOW_MIGRATION_FAILURE: Lazy<bool> = Lazy::new(|| {
    std::env::var("ALLOW_MIGRATION_FAILURE")
        .ok()
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            matches!(normalized.as_str(), "1" | "true" | "yes")
        })
        .unwrap_or(false)
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),
    #[error("environment variable {key} has invalid value `{value}`")]
    Invalid { key: &'static str, value: String },
    #[error("environment variable {0} is not a valid connection string")]
    Unparsable(&'static str),
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub target: DatabaseTarget,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub enum DatabaseTarget {
    /// A complete `DATABASE_URL`, already checked to parse.
    Url(String),
    Parts(DatabaseParts),
}

/// Individual connection settings. Values are passed to the driver as-is,
/// so reserved URL characters in the password need no escaping.
#[derive(Debug, Clone)]
pub struct DatabaseParts {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: PgSslMode,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        match &self.target {
            DatabaseTarget::Url(url) => PgConnectOptions::from_str(url)
                .map_err(|_| ConfigError::Unparsable("DATABASE_URL")),
            DatabaseTarget::Parts(parts) => Ok(PgConnectOptions::new()
                .host(&parts.host)
                .port(parts.port)
                .username(&parts.user)
                .password(&parts.password)
                .database(&parts.name)
                .ssl_mode(parts.ssl_mode)),
        }
    }
}

/// Reads the Postgres connection settings.
///
/// `DATABASE_URL` wins when present. Otherwise the connection is built from
/// `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and `DB_NAME`, all of which
/// are then required, plus an optional `DB_SSLMODE` (default `disable`).
pub fn database_config_from_env() -> Result<DatabaseConfig, ConfigError> {
    let max_connections = match read_optional_env("DB_MAX_CONNECTIONS") {
        Some(raw) => raw
            .parse::<u32>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                value: raw,
            })?,
        None => 5,
    };

    if let Some(url) = read_optional_env("DATABASE_URL") {
        // The URL may embed a password, keep it out of the error
        if PgConnectOptions::from_str(&url).is_err() {
            return Err(ConfigError::Unparsable("DATABASE_URL"));
        }
        return Ok(DatabaseConfig {
            target: DatabaseTarget::Url(url),
            max_connections,
        });
    }

    let host = require_env("DB_HOST")?;
    let raw_port = require_env("DB_PORT")?;
    let port = raw_port.parse::<u16>().map_err(|_| ConfigError::Invalid {
        key: "DB_PORT",
        value: raw_port.clone(),
    })?;
    let user = require_env("DB_USER")?;
    let password = require_env("DB_PASSWORD")?;
    let name = require_env("DB_NAME")?;
    let raw_ssl_mode = read_optional_env("DB_SSLMODE").unwrap_or_else(|| "disable".to_string());
    let ssl_mode = PgSslMode::from_str(&raw_ssl_mode).map_err(|_| ConfigError::Invalid {
        key: "DB_SSLMODE",
        value: raw_ssl_mode.clone(),
    })?;

    Ok(DatabaseConfig {
        target: DatabaseTarget::Parts(DatabaseParts {
            host,
            port,
            user,
            password,
            name,
            ssl_mode,
        }),
        max_connections,
    })
}

/// Parses a `LOG_LEVEL` value such as `debug` or `WARN`.
pub fn log_level_filter(raw: &str) -> Result<LevelFilter, ConfigError> {
    LevelFilter::from_str(raw.trim()).map_err(|_| ConfigError::Invalid {
        key: "LOG_LEVEL",
        value: raw.to_string(),
    })
}

fn require_env(key: &'static str) -> Result<String, ConfigError> {
    read_optional_env(key).ok_or(ConfigError::Missing(key))
}

fn read_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
