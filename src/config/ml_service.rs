//! Prediction service configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound for either prediction service deadline.
const MAX_TIMEOUT_MS: u64 = 60_000;

/// Prediction service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MlServiceConfig {
    /// Base URL of the service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deadline for the health check in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub health_timeout_ms: u64,

    /// Deadline for a prediction in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub predict_timeout_ms: u64,
}

impl MlServiceConfig {
    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn predict_timeout(&self) -> Duration {
        Duration::from_millis(self.predict_timeout_ms)
    }

    /// Validate prediction service configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidMlServiceUrl);
        }
        for timeout in [self.health_timeout_ms, self.predict_timeout_ms] {
            if timeout == 0 || timeout > MAX_TIMEOUT_MS {
                return Err(ValidationError::InvalidMlTimeout);
            }
        }
        Ok(())
    }
}

impl Default for MlServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            health_timeout_ms: default_timeout_ms(),
            predict_timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}
