//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod learning;

pub use learning::{
    // Classification services
    ClassificationRun, ClassificationRunner, HybridClassifier, HybridClassifierConfig,
    // Commands
    PurgeExpiredBehaviorCommand, PurgeExpiredBehaviorHandler, PurgeExpiredBehaviorResult,
    RecordFeedbackCommand, RecordFeedbackHandler, RecordFeedbackResult,
    SubmitQuestionnaireCommand, SubmitQuestionnaireHandler,
    TrackBehaviorCommand, TrackBehaviorHandler, TrackBehaviorResult, TrackingPolicy,
    TriggerClassificationCommand, TriggerClassificationHandler, TriggerClassificationResult,
    // Queries
    BehaviorSummary, GetBehaviorSummaryHandler, GetBehaviorSummaryQuery,
    ClassificationStatus, GetClassificationStatusHandler, GetClassificationStatusQuery,
    GetLearningProfileHandler, GetLearningProfileQuery, LearningProfileView,
};
