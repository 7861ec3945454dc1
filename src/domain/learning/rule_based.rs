//! Deterministic rule-based FSLSM scoring.
//!
//! Each axis is a weighted sum of feature contrasts scaled to the ±11
//! range. This path has no I/O and cannot fail: it is the fallback
//! whenever the prediction service is unavailable.

use super::dimensions::{DimensionConfidence, DimensionScores, StyleEstimate, SCORE_BOUND};
use super::features::{BehavioralFeatures, EngineeredFeatures};

const SCALE: f64 = SCORE_BOUND as f64;

/// Scores features with fixed FSLSM heuristics.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Balanced scores with zero confidence when there is no data.
    pub fn classify(&self, features: &EngineeredFeatures) -> StyleEstimate {
        if features.total_interactions() == 0 {
            return StyleEstimate::default();
        }

        let f = &features.behavioral;
        let dimensions = DimensionScores::from_raw(
            active_reflective(f),
            sensing_intuitive(f),
            visual_verbal(f),
            sequential_global(f),
        );

        let base = features.quality.completeness.as_fraction();
        let confidence = DimensionConfidence::new(
            axis_confidence(
                [
                    f.active_learning_usage_ratio,
                    f.reflective_learning_usage_ratio,
                    f.discussion_participation_rate,
                    f.reflection_journal_frequency,
                ],
                base,
            ),
            axis_confidence(
                [
                    f.sensing_learning_usage_ratio,
                    f.intuitive_learning_usage_ratio,
                    f.practical_lab_completion_rate,
                    f.abstract_pattern_exploration_rate,
                ],
                base,
            ),
            axis_confidence(
                [
                    f.visual_learning_usage_ratio,
                    f.ai_narrator_usage_ratio,
                    f.diagram_view_frequency,
                    f.audio_narration_usage,
                ],
                base,
            ),
            axis_confidence(
                [
                    f.sequential_learning_usage_ratio,
                    f.global_learning_usage_ratio,
                    f.step_by_step_completion_rate,
                    f.overview_first_behavior,
                ],
                base,
            ),
        );

        StyleEstimate {
            dimensions,
            confidence,
        }
    }
}

/// Natural log that treats non-positive input as neutral.
fn ln_or_zero(value: f64) -> f64 {
    if value > 0.0 {
        value.ln()
    } else {
        0.0
    }
}

fn active_reflective(f: &BehavioralFeatures) -> f64 {
    let mode = f.active_learning_usage_ratio - f.reflective_learning_usage_ratio;
    let activity = f.discussion_participation_rate - f.reflection_journal_frequency;
    let group = (f.group_activity_preference - 0.5) * 2.0;
    let application = f.immediate_application_rate - 0.5;
    SCALE * (0.4 * mode + 0.3 * activity + 0.2 * group + 0.1 * application)
}

fn sensing_intuitive(f: &BehavioralFeatures) -> f64 {
    let mode = f.sensing_learning_usage_ratio - f.intuitive_learning_usage_ratio;
    let activity = f.practical_lab_completion_rate - f.abstract_pattern_exploration_rate;
    let preference = ln_or_zero(f.concrete_vs_abstract_preference);
    let experiment = f.experimentation_frequency - 0.5;
    SCALE * (0.4 * mode + 0.3 * activity + 0.2 * preference + 0.1 * experiment)
}

fn visual_verbal(f: &BehavioralFeatures) -> f64 {
    let mode = f.visual_learning_usage_ratio - f.ai_narrator_usage_ratio;
    let media = f.diagram_view_frequency - f.audio_narration_usage;
    let preference = ln_or_zero(f.visual_vs_verbal_preference);
    SCALE * (0.5 * mode + 0.3 * media + 0.2 * preference)
}

fn sequential_global(f: &BehavioralFeatures) -> f64 {
    let mode = f.sequential_learning_usage_ratio - f.global_learning_usage_ratio;
    let behavior = f.step_by_step_completion_rate - f.overview_first_behavior;
    let preference = ln_or_zero(f.sequential_vs_global_preference);
    let progression = f.linear_progression_rate - 0.5;
    SCALE * (0.4 * mode + 0.3 * behavior + 0.2 * preference + 0.1 * progression)
}

/// `0.6 * base + 0.4 * (share of primary features that are non-zero)`.
fn axis_confidence(primary: [f64; 4], base: f64) -> f64 {
    let meaningful = primary.iter().filter(|v| **v > 0.0).count() as f64;
    base * 0.6 + (meaningful / 4.0) * 0.4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{BehaviorSessionId, Timestamp, UserId};
    use crate::domain::learning::aggregation::AggregatedStats;
    use crate::domain::learning::behavior::SessionBehaviorRecord;
    use crate::domain::learning::dimensions::FslsmDimension;
    use crate::domain::learning::features::engineer_features;
    use serde_json::json;

    fn features_from(value: serde_json::Value) -> EngineeredFeatures {
        let mut record = SessionBehaviorRecord::open(
            UserId::new("learner-1").unwrap(),
            BehaviorSessionId::new("s1").unwrap(),
            Timestamp::now(),
        );
        record.merge(serde_json::from_value(value).unwrap(), Timestamp::now());
        let mut stats = AggregatedStats::default();
        stats.fold(&mut record, Timestamp::now());
        engineer_features(&stats)
    }

    #[test]
    fn no_interactions_is_balanced_with_zero_confidence() {
        let estimate = RuleBasedClassifier::new().classify(&engineer_features(&AggregatedStats::default()));

        assert_eq!(estimate, StyleEstimate::default());
        assert_eq!(estimate.dimensions.dominant_style(), "Balanced");
    }

    #[test]
    fn active_heavy_learner_scores_active() {
        let estimate = RuleBasedClassifier::new().classify(&features_from(json!({
            "modeUsage": { "activeLearning": { "count": 30, "totalTime": 600000 } },
            "activityEngagement": { "discussionParticipation": 12, "practiceQuestionsAttempted": 20 }
        })));

        assert!(estimate.dimensions.get(FslsmDimension::ActiveReflective) >= 3);
    }

    #[test]
    fn narrator_heavy_learner_scores_verbal() {
        let estimate = RuleBasedClassifier::new().classify(&features_from(json!({
            "modeUsage": { "aiNarrator": { "count": 40, "totalTime": 900000 } }
        })));

        assert!(estimate.dimensions.get(FslsmDimension::VisualVerbal) <= -3);
        assert!(estimate.dimensions.dominant_style().contains("Verbal"));
    }

    #[test]
    fn global_heavy_learner_scores_global() {
        let estimate = RuleBasedClassifier::new().classify(&features_from(json!({
            "modeUsage": { "globalLearning": { "count": 25, "totalTime": 500000 } }
        })));

        assert!(estimate.dimensions.get(FslsmDimension::SequentialGlobal) < 0);
    }

    #[test]
    fn scores_and_confidence_stay_in_bounds_for_extreme_input() {
        let estimate = RuleBasedClassifier::new().classify(&features_from(json!({
            "modeUsage": { "sensingLearning": { "count": 1, "totalTime": 1e15 } },
            "activityEngagement": { "handsOnLabsCompleted": 1e12, "reflectionJournalEntries": 1e12 }
        })));

        for dimension in FslsmDimension::ALL {
            let score = estimate.dimensions.get(dimension);
            let confidence = estimate.confidence.get(dimension);
            assert!((-11..=11).contains(&score));
            assert!((0.0..=1.0).contains(&confidence));
        }
    }

    #[test]
    fn confidence_blends_completeness_and_feature_coverage() {
        let features = features_from(json!({
            "modeUsage": {
                "activeLearning": { "count": 10, "totalTime": 150000 },
                "reflectiveLearning": { "count": 10, "totalTime": 150000 }
            },
            "activityEngagement": { "discussionParticipation": 2, "reflectionJournalEntries": 2 }
        }));
        let estimate = RuleBasedClassifier::new().classify(&features);

        // completeness: (100 + 100 + 20) / 3 = 73%
        let expected = 0.73 * 0.6 + 0.4;
        let actual = estimate.confidence.get(FslsmDimension::ActiveReflective);
        assert!((actual - expected).abs() < 1e-9);
        let visual = estimate.confidence.get(FslsmDimension::VisualVerbal);
        assert!((visual - 0.73 * 0.6).abs() < 1e-9);
    }
}
