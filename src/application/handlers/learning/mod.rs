//! Learning style handlers.
//!
//! ## Commands
//! - Track behavior (record, fold, milestone gate)
//! - Trigger classification on demand
//! - Submit questionnaire
//! - Record recommendation feedback
//! - Purge expired behavior records
//!
//! ## Queries
//! - Classification status
//! - Learning profile
//! - Behavior summary
//!
//! `HybridClassifier` and `ClassificationRunner` are shared by the tracking
//! pipeline and the explicit classify command.

mod classification_runner;
mod get_behavior_summary;
mod get_classification_status;
mod get_learning_profile;
mod hybrid_classifier;
mod purge_expired_behavior;
mod record_feedback;
mod submit_questionnaire;
mod track_behavior;
mod trigger_classification;

// Classification services
pub use classification_runner::{ClassificationRun, ClassificationRunner};
pub use hybrid_classifier::{HybridClassifier, HybridClassifierConfig, INSUFFICIENT_DATA_REASON};

// Commands
pub use purge_expired_behavior::{
    PurgeExpiredBehaviorCommand, PurgeExpiredBehaviorHandler, PurgeExpiredBehaviorResult,
};
pub use record_feedback::{RecordFeedbackCommand, RecordFeedbackHandler, RecordFeedbackResult};
pub use submit_questionnaire::{SubmitQuestionnaireCommand, SubmitQuestionnaireHandler};
pub use track_behavior::{
    TrackBehaviorCommand, TrackBehaviorHandler, TrackBehaviorResult, TrackingPolicy,
};
pub use trigger_classification::{
    TriggerClassificationCommand, TriggerClassificationHandler, TriggerClassificationResult,
};

// Queries
pub use get_behavior_summary::{BehaviorSummary, GetBehaviorSummaryHandler, GetBehaviorSummaryQuery};
pub use get_classification_status::{
    ClassificationStatus, GetClassificationStatusHandler, GetClassificationStatusQuery,
};
pub use get_learning_profile::{GetLearningProfileHandler, GetLearningProfileQuery, LearningProfileView};
