//! Feature engineering - aggregated totals to FSLSM feature vectors.
//!
//! Pure functions only. Every ratio with a zero denominator is 0, so no
//! output field is ever NaN or infinite.

use serde::{Deserialize, Serialize};

use super::aggregation::AggregatedStats;
use crate::domain::foundation::Percentage;

/// Number of features in both the behavioral vector and the ML payload.
pub const FEATURE_COUNT: usize = 24;

const MIN_INTERACTIONS: u64 = 10;
const MIN_LEARNING_TIME_MS: u64 = 30_000;
const MIN_SESSIONS: u64 = 1;
const FULL_INTERACTIONS: u64 = 20;
const FULL_LEARNING_TIME_MS: u64 = 300_000;
const FULL_SESSIONS: u64 = 5;

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// `(a + 1) / (b + 1)`: above 1 favours `a`, below 1 favours `b`.
fn preference(a: u64, b: u64) -> f64 {
    (a as f64 + 1.0) / (b as f64 + 1.0)
}

/// Squashes a preference above 1 into (0, 1] for export.
fn squash(value: f64) -> f64 {
    if value > 1.0 {
        1.0 / (1.0 + value.ln())
    } else {
        value
    }
}

/// The 24 behavioral features, six per FSLSM dimension.
///
/// Preference fields hold raw ratios here; [`BehavioralFeatures::normalized`]
/// squashes them for export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehavioralFeatures {
    // Active / Reflective
    pub active_learning_usage_ratio: f64,
    pub reflective_learning_usage_ratio: f64,
    pub discussion_participation_rate: f64,
    pub reflection_journal_frequency: f64,
    pub group_activity_preference: f64,
    pub immediate_application_rate: f64,

    // Sensing / Intuitive
    pub sensing_learning_usage_ratio: f64,
    pub intuitive_learning_usage_ratio: f64,
    pub practical_lab_completion_rate: f64,
    pub abstract_pattern_exploration_rate: f64,
    pub concrete_vs_abstract_preference: f64,
    pub experimentation_frequency: f64,

    // Visual / Verbal
    pub visual_learning_usage_ratio: f64,
    pub ai_narrator_usage_ratio: f64,
    pub diagram_view_frequency: f64,
    pub audio_narration_usage: f64,
    pub visual_vs_verbal_preference: f64,
    pub visual_aid_engagement: f64,

    // Sequential / Global
    pub sequential_learning_usage_ratio: f64,
    pub global_learning_usage_ratio: f64,
    pub step_by_step_completion_rate: f64,
    pub overview_first_behavior: f64,
    pub sequential_vs_global_preference: f64,
    pub linear_progression_rate: f64,
}

impl Default for BehavioralFeatures {
    /// Features of a learner with no recorded behavior.
    fn default() -> Self {
        Self {
            active_learning_usage_ratio: 0.0,
            reflective_learning_usage_ratio: 0.0,
            discussion_participation_rate: 0.0,
            reflection_journal_frequency: 0.0,
            group_activity_preference: 0.5,
            immediate_application_rate: 0.0,
            sensing_learning_usage_ratio: 0.0,
            intuitive_learning_usage_ratio: 0.0,
            practical_lab_completion_rate: 0.0,
            abstract_pattern_exploration_rate: 0.0,
            concrete_vs_abstract_preference: 1.0,
            experimentation_frequency: 0.0,
            visual_learning_usage_ratio: 0.0,
            ai_narrator_usage_ratio: 0.0,
            diagram_view_frequency: 0.0,
            audio_narration_usage: 0.0,
            visual_vs_verbal_preference: 1.0,
            visual_aid_engagement: 0.0,
            sequential_learning_usage_ratio: 0.0,
            global_learning_usage_ratio: 0.0,
            step_by_step_completion_rate: 0.0,
            overview_first_behavior: 0.0,
            sequential_vs_global_preference: 1.0,
            linear_progression_rate: 0.0,
        }
    }
}

impl BehavioralFeatures {
    /// Stable feature names, in vector order.
    pub const NAMES: [&'static str; FEATURE_COUNT] = [
        "activeLearningUsageRatio",
        "reflectiveLearningUsageRatio",
        "discussionParticipationRate",
        "reflectionJournalFrequency",
        "groupActivityPreference",
        "immediateApplicationRate",
        "sensingLearningUsageRatio",
        "intuitiveLearningUsageRatio",
        "practicalLabCompletionRate",
        "abstractPatternExplorationRate",
        "concreteVsAbstractPreference",
        "experimentationFrequency",
        "visualLearningUsageRatio",
        "aiNarratorUsageRatio",
        "diagramViewFrequency",
        "audioNarrationUsage",
        "visualVsVerbalPreference",
        "visualAidEngagement",
        "sequentialLearningUsageRatio",
        "globalLearningUsageRatio",
        "stepByStepCompletionRate",
        "overviewFirstBehavior",
        "sequentialVsGlobalPreference",
        "linearProgressionRate",
    ];

    /// Copy with the four preference fields squashed into (0, 1].
    pub fn normalized(&self) -> Self {
        Self {
            group_activity_preference: squash(self.group_activity_preference),
            concrete_vs_abstract_preference: squash(self.concrete_vs_abstract_preference),
            visual_vs_verbal_preference: squash(self.visual_vs_verbal_preference),
            sequential_vs_global_preference: squash(self.sequential_vs_global_preference),
            ..*self
        }
    }

    /// Normalized values in [`Self::NAMES`] order.
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        let n = self.normalized();
        [
            n.active_learning_usage_ratio,
            n.reflective_learning_usage_ratio,
            n.discussion_participation_rate,
            n.reflection_journal_frequency,
            n.group_activity_preference,
            n.immediate_application_rate,
            n.sensing_learning_usage_ratio,
            n.intuitive_learning_usage_ratio,
            n.practical_lab_completion_rate,
            n.abstract_pattern_exploration_rate,
            n.concrete_vs_abstract_preference,
            n.experimentation_frequency,
            n.visual_learning_usage_ratio,
            n.ai_narrator_usage_ratio,
            n.diagram_view_frequency,
            n.audio_narration_usage,
            n.visual_vs_verbal_preference,
            n.visual_aid_engagement,
            n.sequential_learning_usage_ratio,
            n.global_learning_usage_ratio,
            n.step_by_step_completion_rate,
            n.overview_first_behavior,
            n.sequential_vs_global_preference,
            n.linear_progression_rate,
        ]
    }
}

/// The 24-field payload sent to the prediction service's `/predict`.
///
/// Field order and names are part of the service contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MlFeatures {
    pub active_mode_ratio: f64,
    pub questions_generated: f64,
    pub debates_participated: f64,
    pub reflective_mode_ratio: f64,
    pub reflections_written: f64,
    pub journal_entries: f64,

    pub sensing_mode_ratio: f64,
    pub simulations_completed: f64,
    pub challenges_completed: f64,
    pub intuitive_mode_ratio: f64,
    pub concepts_explored: f64,
    pub patterns_discovered: f64,

    pub visual_mode_ratio: f64,
    pub diagrams_viewed: f64,
    pub wireframes_explored: f64,
    pub verbal_mode_ratio: f64,
    pub text_read: f64,
    pub summaries_created: f64,

    pub sequential_mode_ratio: f64,
    pub steps_completed: f64,
    pub linear_navigation: f64,
    pub global_mode_ratio: f64,
    pub overviews_viewed: f64,
    pub navigation_jumps: f64,
}

/// Readiness of the aggregate for ML classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureDataQuality {
    #[serde(rename = "sufficientForML")]
    pub sufficient_for_ml: bool,
    pub completeness: Percentage,
    pub interaction_count: u64,
    pub total_time_ms: u64,
    pub session_count: u64,
}

impl FeatureDataQuality {
    fn assess(interactions: u64, time_ms: u64, sessions: u64) -> Self {
        let completeness = Percentage::mean(&[
            Percentage::of_ratio(interactions, FULL_INTERACTIONS),
            Percentage::of_ratio(time_ms, FULL_LEARNING_TIME_MS),
            Percentage::of_ratio(sessions, FULL_SESSIONS),
        ]);
        Self {
            sufficient_for_ml: interactions >= MIN_INTERACTIONS
                && time_ms >= MIN_LEARNING_TIME_MS
                && sessions >= MIN_SESSIONS,
            completeness,
            interaction_count: interactions,
            total_time_ms: time_ms,
            session_count: sessions,
        }
    }
}

/// Everything the classifiers need, derived from one aggregate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineeredFeatures {
    pub behavioral: BehavioralFeatures,
    pub ml: MlFeatures,
    pub quality: FeatureDataQuality,
}

impl EngineeredFeatures {
    pub fn total_interactions(&self) -> u64 {
        self.quality.interaction_count
    }
}

/// Maps aggregated totals to the feature vectors.
pub fn engineer_features(stats: &AggregatedStats) -> EngineeredFeatures {
    let modes = stats.mode_usage();
    let activity = stats.activity_engagement();
    let interactions = stats.total_interactions_processed();
    let sessions = stats.sessions_processed();
    let time = modes.total_time_ms();
    let quality = FeatureDataQuality::assess(interactions, time, sessions);

    if interactions == 0 && time == 0 {
        return EngineeredFeatures {
            behavioral: BehavioralFeatures::default(),
            ml: MlFeatures::default(),
            quality,
        };
    }

    let behavioral = BehavioralFeatures {
        active_learning_usage_ratio: ratio(modes.active_learning.total_time_ms, time),
        reflective_learning_usage_ratio: ratio(modes.reflective_learning.total_time_ms, time),
        discussion_participation_rate: ratio(activity.discussion_participation, interactions),
        reflection_journal_frequency: ratio(activity.reflection_journal_entries, sessions),
        group_activity_preference: activity.discussion_participation as f64
            / (activity.discussion_participation as f64
                + activity.reflection_journal_entries as f64
                + 1.0),
        immediate_application_rate: ratio(activity.practice_questions_attempted, interactions),

        sensing_learning_usage_ratio: ratio(modes.sensing_learning.total_time_ms, time),
        intuitive_learning_usage_ratio: ratio(modes.intuitive_learning.total_time_ms, time),
        practical_lab_completion_rate: ratio(activity.hands_on_labs_completed, interactions),
        abstract_pattern_exploration_rate: ratio(activity.concept_explorations_count, interactions),
        concrete_vs_abstract_preference: preference(
            modes.sensing_learning.total_time_ms,
            modes.intuitive_learning.total_time_ms,
        ),
        experimentation_frequency: ratio(activity.hands_on_labs_completed, sessions),

        visual_learning_usage_ratio: ratio(modes.visual_learning.total_time_ms, time),
        ai_narrator_usage_ratio: ratio(modes.ai_narrator.total_time_ms, time),
        diagram_view_frequency: ratio(activity.visual_diagrams_viewed, interactions),
        audio_narration_usage: ratio(modes.ai_narrator.count, interactions),
        visual_vs_verbal_preference: preference(
            modes.visual_learning.total_time_ms,
            modes.ai_narrator.total_time_ms,
        ),
        visual_aid_engagement: ratio(activity.visual_diagrams_viewed, sessions),

        sequential_learning_usage_ratio: ratio(modes.sequential_learning.total_time_ms, time),
        global_learning_usage_ratio: ratio(modes.global_learning.total_time_ms, time),
        step_by_step_completion_rate: ratio(activity.sequential_steps_completed, interactions),
        overview_first_behavior: ratio(modes.global_learning.count, interactions),
        sequential_vs_global_preference: preference(
            modes.sequential_learning.total_time_ms,
            modes.global_learning.total_time_ms,
        ),
        linear_progression_rate: ratio(activity.sequential_steps_completed, sessions),
    };

    let n = behavioral.normalized();
    let ml = MlFeatures {
        active_mode_ratio: n.active_learning_usage_ratio,
        questions_generated: activity.practice_questions_attempted as f64,
        debates_participated: activity.discussion_participation as f64,
        reflective_mode_ratio: n.reflective_learning_usage_ratio,
        reflections_written: activity.reflection_journal_entries as f64,
        journal_entries: activity.reflection_journal_entries as f64,

        sensing_mode_ratio: n.sensing_learning_usage_ratio,
        simulations_completed: activity.hands_on_labs_completed as f64,
        challenges_completed: activity.practice_questions_attempted as f64,
        intuitive_mode_ratio: n.intuitive_learning_usage_ratio,
        concepts_explored: activity.concept_explorations_count as f64,
        patterns_discovered: activity.concept_explorations_count as f64,

        visual_mode_ratio: n.visual_learning_usage_ratio,
        diagrams_viewed: activity.visual_diagrams_viewed as f64,
        wireframes_explored: activity.visual_diagrams_viewed as f64,
        verbal_mode_ratio: n.ai_narrator_usage_ratio,
        text_read: modes.ai_narrator.count as f64,
        summaries_created: (activity.reflection_journal_entries / 2) as f64,

        sequential_mode_ratio: n.sequential_learning_usage_ratio,
        steps_completed: activity.sequential_steps_completed as f64,
        linear_navigation: activity.sequential_steps_completed as f64,
        global_mode_ratio: n.global_learning_usage_ratio,
        overviews_viewed: modes.global_learning.count as f64,
        navigation_jumps: modes.global_learning.count as f64,
    };

    EngineeredFeatures {
        behavioral,
        ml,
        quality,
    }
}
