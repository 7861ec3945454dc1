//! Learning mode recommendations derived from dimension scores.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::dimensions::{DimensionConfidence, DimensionScores, FslsmDimension, DOMINANT_THRESHOLD};

/// Confidence reported when a classifier gave none for an axis.
const DEFAULT_RECOMMENDATION_CONFIDENCE: f64 = 0.5;

/// Learning modes the platform can recommend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendedMode {
    #[serde(rename = "AI Narrator")]
    AiNarrator,
    #[serde(rename = "Visual Learning")]
    VisualLearning,
    #[serde(rename = "Sequential Learning")]
    SequentialLearning,
    #[serde(rename = "Global Learning")]
    GlobalLearning,
    #[serde(rename = "Hands-On Lab")]
    HandsOnLab,
    #[serde(rename = "Concept Constellation")]
    ConceptConstellation,
    #[serde(rename = "Active Learning Hub")]
    ActiveLearningHub,
    #[serde(rename = "Reflective Learning")]
    ReflectiveLearning,
}

impl RecommendedMode {
    pub fn name(&self) -> &'static str {
        match self {
            RecommendedMode::AiNarrator => "AI Narrator",
            RecommendedMode::VisualLearning => "Visual Learning",
            RecommendedMode::SequentialLearning => "Sequential Learning",
            RecommendedMode::GlobalLearning => "Global Learning",
            RecommendedMode::HandsOnLab => "Hands-On Lab",
            RecommendedMode::ConceptConstellation => "Concept Constellation",
            RecommendedMode::ActiveLearningHub => "Active Learning Hub",
            RecommendedMode::ReflectiveLearning => "Reflective Learning",
        }
    }
}

impl fmt::Display for RecommendedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One ranked recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeRecommendation {
    pub mode: RecommendedMode,
    /// 1 is the strongest recommendation.
    pub priority: u8,
    pub reason: String,
    pub confidence: f64,
    pub dimension: FslsmDimension,
    pub score: i8,
}

/// Mode and (strong, mild) reasons for one pole of an axis.
fn pole_choice(dimension: FslsmDimension, positive: bool) -> (RecommendedMode, &'static str, &'static str) {
    match (dimension, positive) {
        (FslsmDimension::ActiveReflective, true) => (
            RecommendedMode::ActiveLearningHub,
            "You learn best through hands-on activities and group discussions",
            "You show a preference for active learning approaches",
        ),
        (FslsmDimension::ActiveReflective, false) => (
            RecommendedMode::ReflectiveLearning,
            "You prefer individual contemplation and deep analysis",
            "You show a preference for reflective learning approaches",
        ),
        (FslsmDimension::SensingIntuitive, true) => (
            RecommendedMode::HandsOnLab,
            "You prefer practical, concrete examples and real-world applications",
            "You show a preference for concrete, factual learning",
        ),
        (FslsmDimension::SensingIntuitive, false) => (
            RecommendedMode::ConceptConstellation,
            "You enjoy exploring abstract patterns and theoretical frameworks",
            "You show a preference for abstract, conceptual learning",
        ),
        (FslsmDimension::VisualVerbal, true) => (
            RecommendedMode::VisualLearning,
            "You learn best with diagrams, charts, and visual representations",
            "You show a preference for visual learning materials",
        ),
        (FslsmDimension::VisualVerbal, false) => (
            RecommendedMode::AiNarrator,
            "You prefer written and spoken explanations",
            "You show a preference for text-based learning",
        ),
        (FslsmDimension::SequentialGlobal, true) => (
            RecommendedMode::SequentialLearning,
            "You prefer step-by-step, logical progression",
            "You show a preference for sequential learning paths",
        ),
        (FslsmDimension::SequentialGlobal, false) => (
            RecommendedMode::GlobalLearning,
            "You prefer seeing the big picture and overall context first",
            "You show a preference for holistic learning approaches",
        ),
    }
}

/// One recommendation per axis, strongest preference first.
///
/// A zero score picks the positive pole. Priority is the rank after sorting.
pub fn recommend_modes(scores: &DimensionScores, confidence: &DimensionConfidence) -> Vec<ModeRecommendation> {
    let mut recommendations: Vec<ModeRecommendation> = FslsmDimension::ALL
        .iter()
        .map(|dimension| {
            let score = scores.get(*dimension);
            let (mode, strong, mild) = pole_choice(*dimension, score >= 0);
            let reason = if score.unsigned_abs() >= DOMINANT_THRESHOLD.unsigned_abs() {
                strong
            } else {
                mild
            };
            let axis_confidence = confidence.get(*dimension);
            ModeRecommendation {
                mode,
                priority: 0,
                reason: reason.to_string(),
                confidence: if axis_confidence > 0.0 {
                    axis_confidence
                } else {
                    DEFAULT_RECOMMENDATION_CONFIDENCE
                },
                dimension: *dimension,
                score,
            }
        })
        .collect();

    // stable sort keeps axis order among equal strengths
    recommendations.sort_by_key(|r| std::cmp::Reverse(r.score.unsigned_abs()));
    for (rank, recommendation) in recommendations.iter_mut().enumerate() {
        recommendation.priority = rank as u8 + 1;
    }
    recommendations
}
