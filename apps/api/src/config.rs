//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;

use biashara_db::{DbConfig, SettlementConfig};

const DEV_JWT_SECRET: &str = "biashara-dev-secret-change-in-production";

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Listen address
    pub bind_addr: String,

    /// HTTP port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// How long a sale waits for the database write lock
    pub db_busy_timeout: Duration,

    /// HMAC secret for verifying bearer tokens
    pub jwt_secret: String,

    /// Ceiling for one sale's unit of work
    pub sale_timeout: Duration,

    /// Browser origin allowed to call the API (the dashboard); no CORS
    /// headers are sent when unset
    pub cors_allowed_origin: Option<HeaderValue>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = ApiConfig {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),

            http_port: parse_or(&lookup, "HTTP_PORT", 8080)?,

            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./biashara.db")),

            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,

            db_busy_timeout: Duration::from_millis(parse_or(&lookup, "DB_BUSY_TIMEOUT_MS", 5_000)?),

            // In production this MUST be set via environment variable
            jwt_secret: lookup("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string()),

            sale_timeout: Duration::from_millis(parse_or(&lookup, "SALE_TIMEOUT_MS", 10_000)?),

            cors_allowed_origin: match lookup("CORS_ALLOWED_ORIGIN") {
                Some(raw) if !raw.trim().is_empty() => Some(
                    HeaderValue::from_str(raw.trim())
                        .map_err(|_| ConfigError::InvalidValue("CORS_ALLOWED_ORIGIN".to_string()))?,
                ),
                _ => None,
            },
        };

        if config.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if config.sale_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("SALE_TIMEOUT_MS".to_string()));
        }

        Ok(config)
    }

    /// Socket address to listen on.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.http_port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BIND_ADDR".to_string()))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
            .max_connections(self.db_max_connections)
            .busy_timeout(self.db_busy_timeout)
    }

    pub fn settlement_config(&self) -> SettlementConfig {
        SettlementConfig::new(self.sale_timeout)
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// CORS layer for the configured dashboard origin.
    pub fn cors_layer(&self) -> Option<CorsLayer> {
        self.cors_allowed_origin.clone().map(|origin| {
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
