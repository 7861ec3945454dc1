//! Classification policy configuration
//!
//! Data-quality thresholds, tier labels and whether milestone
//! classification runs off the request path.

use serde::Deserialize;

use crate::domain::learning::{DataQualityPolicy, TierPercentages};

use super::error::ValidationError;

/// Classification policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationConfig {
    /// Interactions before the aggregate is sufficient for ML
    #[serde(default = "default_sufficient_for_ml")]
    pub sufficient_for_ml_threshold: u64,

    /// Interactions that count as 100% data completeness
    #[serde(default = "default_completeness_target")]
    pub completeness_target: u64,

    /// Run milestone classification on a spawned task
    #[serde(default = "default_background")]
    pub background: bool,

    /// Percentage label for the insufficient tier
    #[serde(default = "default_insufficient_pct")]
    pub insufficient_percentage: u8,

    /// Percentage label for the preliminary tier
    #[serde(default = "default_preliminary_pct")]
    pub preliminary_percentage: u8,

    /// Percentage label for the moderate tier
    #[serde(default = "default_moderate_pct")]
    pub moderate_percentage: u8,

    /// Percentage label for the high tier
    #[serde(default = "default_high_pct")]
    pub high_percentage: u8,
}

impl ClassificationConfig {
    pub fn data_quality_policy(&self) -> DataQualityPolicy {
        DataQualityPolicy {
            sufficient_for_ml_threshold: self.sufficient_for_ml_threshold,
            completeness_target: self.completeness_target,
        }
    }

    pub fn tier_percentages(&self) -> TierPercentages {
        TierPercentages {
            insufficient: self.insufficient_percentage,
            preliminary: self.preliminary_percentage,
            moderate: self.moderate_percentage,
            high: self.high_percentage,
        }
    }

    /// Validate classification policy
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.completeness_target == 0 {
            return Err(ValidationError::InvalidCompletenessTarget);
        }
        let tiers = [
            self.insufficient_percentage,
            self.preliminary_percentage,
            self.moderate_percentage,
            self.high_percentage,
        ];
        if tiers.iter().any(|p| *p > 100) || tiers.windows(2).any(|w| w[0] > w[1]) {
            return Err(ValidationError::InvalidTierPercentages);
        }
        Ok(())
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            sufficient_for_ml_threshold: default_sufficient_for_ml(),
            completeness_target: default_completeness_target(),
            background: default_background(),
            insufficient_percentage: default_insufficient_pct(),
            preliminary_percentage: default_preliminary_pct(),
            moderate_percentage: default_moderate_pct(),
            high_percentage: default_high_pct(),
        }
    }
}

fn default_sufficient_for_ml() -> u64 {
    DataQualityPolicy::default().sufficient_for_ml_threshold
}

fn default_completeness_target() -> u64 {
    DataQualityPolicy::default().completeness_target
}

fn default_background() -> bool {
    true
}

fn default_insufficient_pct() -> u8 {
    TierPercentages::default().insufficient
}

fn default_preliminary_pct() -> u8 {
    TierPercentages::default().preliminary
}

fn default_moderate_pct() -> u8 {
    TierPercentages::default().moderate
}

fn default_high_pct() -> u8 {
    TierPercentages::default().high
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain_defaults() {
        let config = ClassificationConfig::default();
        assert_eq!(config.data_quality_policy(), DataQualityPolicy::default());
        assert_eq!(config.tier_percentages(), TierPercentages::default());
        assert!(config.background);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_completeness_target_rejected() {
        let config = ClassificationConfig {
            completeness_target: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidCompletenessTarget));
    }

    #[test]
    fn test_decreasing_tier_percentages_rejected() {
        let config = ClassificationConfig {
            moderate_percentage: 95,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidTierPercentages));
    }
}
