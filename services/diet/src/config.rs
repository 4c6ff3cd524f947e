//! Service configuration
//!
//! Values come from built-in defaults overridden by `DIET_`-prefixed
//! environment variables, with `__` separating nested keys:
//!
//! - `DIET_SERVER__HOST` (default `0.0.0.0`)
//! - `DIET_SERVER__PORT` (default `3333`)
//! - `DIET_SESSION__COOKIE_NAME` (default `sessionId`)
//! - `DIET_SESSION__MAX_AGE_SECONDS` (default 7 days)
//!
//! Variables are read as strings and converted by the target field's type, so
//! a numeric-looking cookie name such as `007` stays intact.
//!
//! Database settings are read separately by `common::database::DatabaseConfig`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

const SEVEN_DAYS: i64 = 60 * 60 * 24 * 7;

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Session cookie configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session token
    pub cookie_name: String,
    /// Cookie lifetime in seconds
    pub max_age_seconds: i64,
}

impl AppConfig {
    /// Load configuration from defaults and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let session = SessionConfig::default();

        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3333)?
            .set_default("session.cookie_name", session.cookie_name)?
            .set_default("session.max_age_seconds", session.max_age_seconds)?
            .add_source(
                Environment::with_prefix("DIET")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "sessionId".to_string(),
            max_age_seconds: SEVEN_DAYS,
        }
    }
}
