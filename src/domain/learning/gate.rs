//! Classification gate - milestone math and confidence tiers.
//!
//! Classification runs at 50, 100 and 200 interactions, then at every
//! multiple of 50 beyond 200. Between milestones the pipeline only
//! aggregates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// First classification milestone.
pub const FIRST_MILESTONE: u64 = 50;
/// Beyond this count, every multiple of [`MILESTONE_STEP`] is a milestone.
pub const STEADY_STATE_START: u64 = 200;
pub const MILESTONE_STEP: u64 = 50;

/// True when `total` is exactly a classification milestone.
pub fn should_classify_now(total: u64) -> bool {
    match total {
        50 | 100 | 200 => true,
        t if t > STEADY_STATE_START => t % MILESTONE_STEP == 0,
        _ => false,
    }
}

/// The smallest milestone strictly greater than `total`.
pub fn next_milestone(total: u64) -> u64 {
    match total {
        t if t < 50 => 50,
        t if t < 100 => 100,
        t if t < STEADY_STATE_START => STEADY_STATE_START,
        t => (t / MILESTONE_STEP + 1) * MILESTONE_STEP,
    }
}

/// The highest milestone in `(previous, current]`, if any.
///
/// A single update can add several interactions at once; this keeps such
/// an update from stepping over a milestone unnoticed.
pub fn crossed_milestone(previous: u64, current: u64) -> Option<u64> {
    if current <= previous {
        return None;
    }
    let mut candidate = current;
    if candidate > STEADY_STATE_START {
        candidate -= candidate % MILESTONE_STEP;
        if candidate > previous && should_classify_now(candidate) {
            return Some(candidate);
        }
        candidate = STEADY_STATE_START;
    }
    [STEADY_STATE_START, 100, FIRST_MILESTONE]
        .into_iter()
        .find(|m| *m <= candidate && *m > previous)
}

/// What the pipeline does after an aggregation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Keep aggregating; nothing to classify yet.
    Accumulate { next_milestone: u64 },
    /// A milestone was reached by this update.
    Classify { milestone: u64 },
}

impl GateDecision {
    /// Decides based on the totals before and after one fold.
    pub fn evaluate(previous_total: u64, current_total: u64) -> Self {
        match crossed_milestone(previous_total, current_total) {
            Some(milestone) => GateDecision::Classify { milestone },
            None => GateDecision::Accumulate {
                next_milestone: next_milestone(current_total),
            },
        }
    }

    pub fn should_classify(&self) -> bool {
        matches!(self, GateDecision::Classify { .. })
    }
}

/// Confidence label derived purely from the interaction count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Insufficient,
    Preliminary,
    Moderate,
    High,
}

impl ConfidenceTier {
    pub fn from_total(total: u64) -> Self {
        match total {
            0..=49 => ConfidenceTier::Insufficient,
            50..=99 => ConfidenceTier::Preliminary,
            100..=199 => ConfidenceTier::Moderate,
            _ => ConfidenceTier::High,
        }
    }

    /// Stage name shown to learners.
    pub fn stage(&self) -> &'static str {
        match self {
            ConfidenceTier::Insufficient => "building",
            ConfidenceTier::Preliminary => "initial",
            ConfidenceTier::Moderate => "refined",
            ConfidenceTier::High => "stable",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Insufficient => "insufficient",
            ConfidenceTier::Preliminary => "preliminary",
            ConfidenceTier::Moderate => "moderate",
            ConfidenceTier::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Heuristic percentage attached to each tier.
///
/// These are labels, not measured accuracies, so they are configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPercentages {
    pub insufficient: u8,
    pub preliminary: u8,
    pub moderate: u8,
    pub high: u8,
}

impl Default for TierPercentages {
    fn default() -> Self {
        Self {
            insufficient: 50,
            preliminary: 65,
            moderate: 78,
            high: 88,
        }
    }
}

impl TierPercentages {
    pub fn for_tier(&self, tier: ConfidenceTier) -> u8 {
        match tier {
            ConfidenceTier::Insufficient => self.insufficient,
            ConfidenceTier::Preliminary => self.preliminary,
            ConfidenceTier::Moderate => self.moderate,
            ConfidenceTier::High => self.high,
        }
    }
}

/// Learner-facing progress message for a given total.
pub fn progress_message(total: u64) -> String {
    if total < FIRST_MILESTONE {
        format!(
            "Need {} more interactions for your first learning style classification",
            FIRST_MILESTONE - total
        )
    } else {
        format!(
            "Learning style will be refined at {} interactions",
            next_milestone(total)
        )
    }
}
