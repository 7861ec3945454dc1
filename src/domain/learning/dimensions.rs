//! The four FSLSM dimensions, their bounded scores and confidences.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bound of every dimension score (inclusive, both signs).
pub const SCORE_BOUND: i8 = 11;

/// Minimum absolute score for a pole to count toward the dominant style.
pub const DOMINANT_THRESHOLD: i8 = 3;

/// A bipolar FSLSM axis. Positive scores lean toward the first pole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FslsmDimension {
    ActiveReflective,
    SensingIntuitive,
    VisualVerbal,
    SequentialGlobal,
}

impl FslsmDimension {
    pub const ALL: [FslsmDimension; 4] = [
        FslsmDimension::ActiveReflective,
        FslsmDimension::SensingIntuitive,
        FslsmDimension::VisualVerbal,
        FslsmDimension::SequentialGlobal,
    ];

    /// Labels of the (positive, negative) poles.
    pub fn poles(&self) -> (&'static str, &'static str) {
        match self {
            FslsmDimension::ActiveReflective => ("Active", "Reflective"),
            FslsmDimension::SensingIntuitive => ("Sensing", "Intuitive"),
            FslsmDimension::VisualVerbal => ("Visual", "Verbal"),
            FslsmDimension::SequentialGlobal => ("Sequential", "Global"),
        }
    }

    /// Human-readable axis name, e.g. `Active/Reflective`.
    pub fn label(&self) -> &'static str {
        match self {
            FslsmDimension::ActiveReflective => "Active/Reflective",
            FslsmDimension::SensingIntuitive => "Sensing/Intuitive",
            FslsmDimension::VisualVerbal => "Visual/Verbal",
            FslsmDimension::SequentialGlobal => "Sequential/Global",
        }
    }

    /// Wire key, as used by the prediction service.
    pub fn key(&self) -> &'static str {
        match self {
            FslsmDimension::ActiveReflective => "activeReflective",
            FslsmDimension::SensingIntuitive => "sensingIntuitive",
            FslsmDimension::VisualVerbal => "visualVerbal",
            FslsmDimension::SequentialGlobal => "sequentialGlobal",
        }
    }
}

impl fmt::Display for FslsmDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Rounds and clamps a raw score into `-11..=11`. Non-finite input is 0.
pub fn clamp_score(raw: f64) -> i8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round()
        .clamp(f64::from(-SCORE_BOUND), f64::from(SCORE_BOUND)) as i8
}

/// Clamps a confidence into [0, 1]. Non-finite input is 0.
pub fn clamp_confidence(raw: f64) -> f64 {
    if raw.is_finite() {
        raw.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Human description of a score's strength.
pub fn interpret_score(score: i8) -> &'static str {
    match score.unsigned_abs() {
        0..=1 => "Balanced",
        2..=3 => "Mild preference",
        4..=5 => "Moderate preference",
        6..=7 => "Strong preference",
        _ => "Very strong preference",
    }
}

/// Scores on the four axes, each within `-11..=11`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScores {
    active_reflective: i8,
    sensing_intuitive: i8,
    visual_verbal: i8,
    sequential_global: i8,
}

impl DimensionScores {
    /// Builds scores from raw values, rounding and clamping each.
    pub fn from_raw(active_reflective: f64, sensing_intuitive: f64, visual_verbal: f64, sequential_global: f64) -> Self {
        Self {
            active_reflective: clamp_score(active_reflective),
            sensing_intuitive: clamp_score(sensing_intuitive),
            visual_verbal: clamp_score(visual_verbal),
            sequential_global: clamp_score(sequential_global),
        }
    }

    pub fn new(active_reflective: i8, sensing_intuitive: i8, visual_verbal: i8, sequential_global: i8) -> Self {
        Self::from_raw(
            f64::from(active_reflective),
            f64::from(sensing_intuitive),
            f64::from(visual_verbal),
            f64::from(sequential_global),
        )
    }

    pub fn get(&self, dimension: FslsmDimension) -> i8 {
        match dimension {
            FslsmDimension::ActiveReflective => self.active_reflective,
            FslsmDimension::SensingIntuitive => self.sensing_intuitive,
            FslsmDimension::VisualVerbal => self.visual_verbal,
            FslsmDimension::SequentialGlobal => self.sequential_global,
        }
    }

    /// Pole labels of every axis with `|score| >= 3`, joined by `-`,
    /// or `"Balanced"` when none clears the bar.
    pub fn dominant_style(&self) -> String {
        let labels: Vec<&str> = FslsmDimension::ALL
            .iter()
            .filter_map(|dimension| {
                let score = self.get(*dimension);
                let (positive, negative) = dimension.poles();
                if score >= DOMINANT_THRESHOLD {
                    Some(positive)
                } else if score <= -DOMINANT_THRESHOLD {
                    Some(negative)
                } else {
                    None
                }
            })
            .collect();

        if labels.is_empty() {
            "Balanced".to_string()
        } else {
            labels.join("-")
        }
    }
}

/// Per-axis confidence, each within [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionConfidence {
    active_reflective: f64,
    sensing_intuitive: f64,
    visual_verbal: f64,
    sequential_global: f64,
}

impl DimensionConfidence {
    pub fn new(active_reflective: f64, sensing_intuitive: f64, visual_verbal: f64, sequential_global: f64) -> Self {
        Self {
            active_reflective: clamp_confidence(active_reflective),
            sensing_intuitive: clamp_confidence(sensing_intuitive),
            visual_verbal: clamp_confidence(visual_verbal),
            sequential_global: clamp_confidence(sequential_global),
        }
    }

    /// The same confidence on every axis.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn get(&self, dimension: FslsmDimension) -> f64 {
        match dimension {
            FslsmDimension::ActiveReflective => self.active_reflective,
            FslsmDimension::SensingIntuitive => self.sensing_intuitive,
            FslsmDimension::VisualVerbal => self.visual_verbal,
            FslsmDimension::SequentialGlobal => self.sequential_global,
        }
    }

    pub fn mean(&self) -> f64 {
        FslsmDimension::ALL.iter().map(|d| self.get(*d)).sum::<f64>() / 4.0
    }
}

/// A classifier's estimate: scores plus per-axis confidence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleEstimate {
    pub dimensions: DimensionScores,
    pub confidence: DimensionConfidence,
}
