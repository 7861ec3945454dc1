//! Authentication configuration (HS256 JWT)

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::fmt;

use super::error::ValidationError;
use super::server::Environment;

/// Shortest signing secret accepted in production.
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Authentication configuration
#[derive(Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 signing secret
    #[serde(default)]
    pub jwt_secret: Option<Secret<String>>,

    /// Name of the cookie checked when no Authorization header is sent
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

impl AuthConfig {
    /// Validate authentication configuration
    ///
    /// The secret is always required. Production additionally requires a
    /// secret of at least [`MIN_PRODUCTION_SECRET_LEN`] bytes.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self
            .jwt_secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .unwrap_or_default();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if *environment == Environment::Production && secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ValidationError::JwtSecretTooShort(MIN_PRODUCTION_SECRET_LEN));
        }
        if self.cookie_name.trim().is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__COOKIE_NAME"));
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            cookie_name: default_cookie_name(),
        }
    }
}

fn default_cookie_name() -> String {
    "token".to_string()
}
