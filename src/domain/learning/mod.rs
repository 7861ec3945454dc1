//! Learning style domain.
//!
//! Behavior tracking, incremental aggregation, feature engineering, the
//! classification gate, rule-based scoring and the profile aggregate.

mod aggregation;
mod behavior;
mod counters;
mod dimensions;
mod features;
mod gate;
mod profile;
mod questionnaire;
mod recommendations;
mod rule_based;
mod tracking;

pub use aggregation::{AggregatedStats, DataQuality, DataQualityPolicy, FoldOutcome};
pub use behavior::{
    BehaviorSnapshot, ContentInteraction, ContentType, DeviceInfo, MergeReport, RatioFeatures,
    SessionBehaviorRecord, MAX_CONTENT_INTERACTIONS,
};
pub use counters::{
    clamp_counter, ActivityEngagement, AiAssistantUsage, LearningMode, ModeCounter, ModeUsage,
    SessionCounters,
};
pub use dimensions::{
    clamp_confidence, clamp_score, interpret_score, DimensionConfidence, DimensionScores,
    FslsmDimension, StyleEstimate, DOMINANT_THRESHOLD, SCORE_BOUND,
};
pub use features::{
    engineer_features, BehavioralFeatures, EngineeredFeatures, FeatureDataQuality, MlFeatures,
    FEATURE_COUNT,
};
pub use gate::{
    crossed_milestone, next_milestone, progress_message, should_classify_now, ConfidenceTier,
    GateDecision, TierPercentages, FIRST_MILESTONE,
};
pub use profile::{
    ClassificationMetadata, ClassificationMethod, ClassificationOutcome, ClassifierPath,
    FeedbackRating, LearningStyleProfile, ProfileMutation, ProfileVersion, UserFeedback,
    DEFAULT_MODEL_VERSION, MAX_FEEDBACK_ENTRIES,
};
pub use questionnaire::{QuestionnaireAnswer, QuestionnaireResponses, QUESTIONS_PER_DIMENSION};
pub use recommendations::{recommend_modes, ModeRecommendation, RecommendedMode};
pub use rule_based::RuleBasedClassifier;
pub use tracking::{track_session, TrackedSession};
