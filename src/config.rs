//! Configuration management for careminder.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `TASK_STORE` - Optional. Storage backend, `sqlite` or `memory`. Defaults to `sqlite`.
//! - `DATA_DIR` - Optional. Directory for the SQLite database. Defaults to `./data`.
//! - `JWT_SECRET` - Optional. Signing key for session tokens. Defaults to a
//!   development-only value; set a strong secret in production.
//! - `TOKEN_TTL_HOURS` - Optional. Session token lifetime. Defaults to `1`.
//! - `TWILIO_ACCOUNT_SID` - Optional. Twilio account for SMS notifications.
//! - `TWILIO_AUTH_TOKEN` - Optional. Twilio API token.
//! - `TWILIO_FROM_NUMBER` - Optional. Sender phone number for SMS.
//!
//! When the Twilio variables are not all set, completion notifications are
//! disabled: tasks still complete, delivery is reported as failed.

use std::path::PathBuf;
use thiserror::Error;

use crate::store::StoreKind;

/// Development fallback for `JWT_SECRET`; a warning is logged when used.
pub const DEFAULT_JWT_SECRET: &str = "secret-key";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// SMS channel configuration.
#[derive(Debug, Clone, Default)]
pub struct TwilioConfig {
    /// Twilio account SID
    pub account_sid: Option<String>,

    /// Twilio auth token
    pub auth_token: Option<String>,

    /// E.164 sender number messages are sent from
    pub from_number: Option<String>,
}

impl TwilioConfig {
    /// Check if the SMS channel is enabled (all credentials configured).
    pub fn is_enabled(&self) -> bool {
        self.account_sid.is_some() && self.auth_token.is_some() && self.from_number.is_some()
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Storage backend for tasks and users
    pub store: StoreKind,

    /// Directory holding the SQLite database file
    pub data_dir: PathBuf,

    /// Signing key for session tokens
    pub jwt_secret: String,

    /// Session token lifetime in hours
    pub token_ttl_hours: i64,

    /// SMS channel configuration
    pub twilio: TwilioConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let store = std::env::var("TASK_STORE")
            .unwrap_or_else(|_| "sqlite".to_string())
            .parse::<StoreKind>()
            .map_err(|e| ConfigError::InvalidValue("TASK_STORE".to_string(), e))?;

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let jwt_secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());

        let token_ttl_hours = std::env::var("TOKEN_TTL_HOURS")
            .unwrap_or_else(|_| "1".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("TOKEN_TTL_HOURS".to_string(), format!("{}", e))
            })?;

        // SMS channel configuration (optional)
        let twilio = TwilioConfig {
            account_sid: std::env::var("TWILIO_ACCOUNT_SID").ok(),
            auth_token: std::env::var("TWILIO_AUTH_TOKEN").ok(),
            from_number: std::env::var("TWILIO_FROM_NUMBER").ok(),
        };

        Ok(Self {
            host,
            port,
            store,
            data_dir,
            jwt_secret,
            token_ttl_hours,
            twilio,
        })
    }

    /// True when the development fallback signing key is in use.
    pub fn using_default_jwt_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(store: StoreKind, data_dir: PathBuf, jwt_secret: String) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            store,
            data_dir,
            jwt_secret,
            token_ttl_hours: 1,
            twilio: TwilioConfig::default(),
        }
    }
}
