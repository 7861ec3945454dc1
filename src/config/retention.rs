//! Behavior record retention configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Retention configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Days a session record is kept after creation
    #[serde(default = "default_days")]
    pub days: u32,

    /// Seconds between sweeps; 0 disables the sweep
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl RetentionConfig {
    /// Sweep period, or `None` when sweeping is disabled
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }

    /// Validate retention configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.days == 0 {
            return Err(ValidationError::InvalidRetention);
        }
        Ok(())
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_days() -> u32 {
    90
}

fn default_sweep_interval() -> u64 {
    6 * 60 * 60
}
