//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `LEARNING_STYLE`
//! prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use learning_style_engine::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod auth;
mod classification;
mod database;
mod error;
mod ml_service;
mod retention;
mod server;

pub use auth::{AuthConfig, MIN_PRODUCTION_SECRET_LEN};
pub use classification::ClassificationConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use ml_service::MlServiceConfig;
pub use retention::RetentionConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "LEARNING_STYLE";

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
/// Every section has defaults; only `auth.jwt_secret` must be provided for
/// [`AppConfig::validate()`] to pass.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (optional PostgreSQL connection)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Authentication configuration (JWT secret, cookie name)
    #[serde(default)]
    pub auth: AuthConfig,

    /// Prediction service configuration
    #[serde(default)]
    pub ml_service: MlServiceConfig,

    /// Classification policy
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// Behavior record retention
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `LEARNING_STYLE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `LEARNING_STYLE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `LEARNING_STYLE__ML_SERVICE__BASE_URL=...` -> `ml_service.base_url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found, section by section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.ml_service.validate()?;
        self.classification.validate()?;
        self.retention.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
