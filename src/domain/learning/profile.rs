//! LearningStyleProfile aggregate root.
//!
//! One profile per user. It owns the running aggregate of every folded
//! session, the latest classification and the learner's feedback. All
//! changes go through typed methods (or a [`ProfileMutation`]) so stores
//! can apply them atomically.

use serde::{Deserialize, Serialize};

use super::aggregation::{AggregatedStats, DataQuality, DataQualityPolicy, FoldOutcome};
use super::behavior::SessionBehaviorRecord;
use super::dimensions::{DimensionConfidence, DimensionScores, StyleEstimate};
use super::gate::ConfidenceTier;
use super::questionnaire::QuestionnaireResponses;
use super::recommendations::{recommend_modes, ModeRecommendation, RecommendedMode};
use crate::domain::foundation::{
    DomainError, ErrorCode, LearningProfileId, Timestamp, UserId, ValidationError,
};

/// Model version recorded when no classifier reported one.
pub const DEFAULT_MODEL_VERSION: &str = "1.0.0";

/// Feedback entries kept per profile, newest last.
pub const MAX_FEEDBACK_ENTRIES: usize = 100;

/// Days after which a classification is considered stale.
pub const STALE_AFTER_DAYS: i64 = 7;

const MAX_COMMENT_LEN: usize = 1000;

/// Profile version for optimistic concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileVersion(u32);

impl ProfileVersion {
    /// Create initial version (1)
    pub fn initial() -> Self {
        Self(1)
    }

    /// Create from a stored value
    pub fn from_u32(value: u32) -> Result<Self, ValidationError> {
        if value == 0 {
            Err(ValidationError::out_of_range("version", 1, i64::from(u32::MAX), 0))
        } else {
            Ok(Self(value))
        }
    }

    /// Increment version
    pub fn increment(&self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Get inner value
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl Default for ProfileVersion {
    fn default() -> Self {
        Self::initial()
    }
}

impl std::fmt::Display for ProfileVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the current dimensions were produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationMethod {
    MlPrediction,
    #[default]
    RuleBased,
    Hybrid,
    Manual,
    Questionnaire,
}

/// Which branch of the hybrid classifier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierPath {
    MlModel,
    RuleBased,
}

impl ClassifierPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierPath::MlModel => "ml_model",
            ClassifierPath::RuleBased => "rule_based",
        }
    }

    pub fn method(&self) -> ClassificationMethod {
        match self {
            ClassifierPath::MlModel => ClassificationMethod::MlPrediction,
            ClassifierPath::RuleBased => ClassificationMethod::RuleBased,
        }
    }
}

/// Output of one hybrid classification run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOutcome {
    pub estimate: StyleEstimate,
    pub path: ClassifierPath,
    pub model_version: Option<String>,
    /// Mean confidence reported by the prediction service.
    pub ml_confidence: Option<f64>,
    /// Why the prediction service was not used, when it was not.
    pub fallback_reason: Option<String>,
}

/// Bookkeeping about the latest classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationMetadata {
    pub method: ClassificationMethod,
    pub model_version: String,
    pub last_prediction: Option<Timestamp>,
    pub prediction_count: u32,
    pub fallback_reason: Option<String>,
    /// Interaction total the stored classifier estimate was computed from.
    #[serde(default)]
    pub classified_interactions: Option<u64>,
}

impl Default for ClassificationMetadata {
    fn default() -> Self {
        Self {
            method: ClassificationMethod::default(),
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            last_prediction: None,
            prediction_count: 0,
            fallback_reason: None,
            classified_interactions: None,
        }
    }
}

/// 1-5 star rating of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackRating(u8);

impl FeedbackRating {
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::out_of_range("rating", 1, 5, i64::from(value)))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// A learner's reaction to a recommended mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFeedback {
    pub recommended_mode: RecommendedMode,
    pub accepted: bool,
    pub rating: Option<FeedbackRating>,
    pub comment: Option<String>,
    pub timestamp: Timestamp,
}

impl UserFeedback {
    pub fn new(
        recommended_mode: RecommendedMode,
        accepted: bool,
        rating: Option<FeedbackRating>,
        comment: Option<String>,
        timestamp: Timestamp,
    ) -> Result<Self, ValidationError> {
        let comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if let Some(text) = &comment {
            if text.chars().count() > MAX_COMMENT_LEN {
                return Err(ValidationError::invalid_format(
                    "comment",
                    format!("must be at most {} characters", MAX_COMMENT_LEN),
                ));
            }
        }
        Ok(Self {
            recommended_mode,
            accepted,
            rating,
            comment,
            timestamp,
        })
    }
}

/// Typed profile updates applied atomically by the profile store.
#[derive(Debug, Clone)]
pub enum ProfileMutation {
    ApplyClassification {
        outcome: ClassificationOutcome,
        /// Replace a questionnaire result (explicit learner action).
        override_questionnaire: bool,
        /// Interaction total the outcome was computed from.
        classified_from: u64,
    },
    ApplyQuestionnaire(QuestionnaireResponses),
    RecordFeedback(UserFeedback),
}

impl ProfileMutation {
    pub fn apply(self, profile: &mut LearningStyleProfile, now: Timestamp) -> Result<(), DomainError> {
        match self {
            ProfileMutation::ApplyClassification {
                outcome,
                override_questionnaire,
                classified_from,
            } => profile.apply_classification(outcome, override_questionnaire, classified_from, now),
            ProfileMutation::ApplyQuestionnaire(responses) => {
                profile.apply_questionnaire(&responses, now);
                Ok(())
            }
            ProfileMutation::RecordFeedback(feedback) => {
                profile.record_feedback(feedback, now);
                Ok(())
            }
        }
    }
}

/// Per-user learning style profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStyleProfile {
    id: LearningProfileId,
    user_id: UserId,
    dimensions: DimensionScores,
    confidence: DimensionConfidence,
    recommended_modes: Vec<ModeRecommendation>,
    classification: ClassificationMetadata,
    ml_confidence_score: Option<f64>,
    user_feedback: Vec<UserFeedback>,
    data_quality: DataQuality,
    aggregated_stats: AggregatedStats,
    version: ProfileVersion,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl LearningStyleProfile {
    /// Creates an empty, unclassified profile.
    pub fn new(user_id: UserId, now: Timestamp) -> Self {
        Self {
            id: LearningProfileId::new(),
            user_id,
            dimensions: DimensionScores::default(),
            confidence: DimensionConfidence::default(),
            recommended_modes: Vec::new(),
            classification: ClassificationMetadata::default(),
            ml_confidence_score: None,
            user_feedback: Vec::new(),
            data_quality: DataQuality::default(),
            aggregated_stats: AggregatedStats::default(),
            version: ProfileVersion::initial(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> LearningProfileId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn dimensions(&self) -> &DimensionScores {
        &self.dimensions
    }

    pub fn confidence(&self) -> &DimensionConfidence {
        &self.confidence
    }

    pub fn recommended_modes(&self) -> &[ModeRecommendation] {
        &self.recommended_modes
    }

    pub fn classification(&self) -> &ClassificationMetadata {
        &self.classification
    }

    pub fn ml_confidence_score(&self) -> Option<f64> {
        self.ml_confidence_score
    }

    pub fn user_feedback(&self) -> &[UserFeedback] {
        &self.user_feedback
    }

    pub fn data_quality(&self) -> &DataQuality {
        &self.data_quality
    }

    pub fn aggregated_stats(&self) -> &AggregatedStats {
        &self.aggregated_stats
    }

    pub fn version(&self) -> ProfileVersion {
        self.version
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn total_interactions(&self) -> u64 {
        self.aggregated_stats.total_interactions_processed()
    }

    /// True once any classification has been applied.
    pub fn is_classified(&self) -> bool {
        self.classification.last_prediction.is_some()
    }

    /// Questionnaire results are kept until the learner overrides them.
    pub fn is_questionnaire_locked(&self) -> bool {
        self.classification.method == ClassificationMethod::Questionnaire
    }

    pub fn dominant_style(&self) -> String {
        self.dimensions.dominant_style()
    }

    pub fn confidence_tier(&self) -> ConfidenceTier {
        ConfidenceTier::from_total(self.total_interactions())
    }

    /// True when never classified or last classified over a week ago.
    pub fn needs_update(&self, now: &Timestamp) -> bool {
        match self.classification.last_prediction {
            Some(last) => now.days_since(&last) > STALE_AFTER_DAYS,
            None => true,
        }
    }

    /// Folds a session into the aggregate and refreshes data quality.
    pub fn fold_session(
        &mut self,
        record: &mut SessionBehaviorRecord,
        policy: &DataQualityPolicy,
        now: Timestamp,
    ) -> FoldOutcome {
        let outcome = self.aggregated_stats.fold(record, now);
        if !outcome.already_folded {
            self.data_quality = DataQuality::assess(outcome.current_total, policy, now);
            self.touch(now);
        }
        outcome
    }

    /// Overwrites the classification with a classifier's result.
    ///
    /// Fails with `QuestionnaireLocked` when the profile holds a
    /// questionnaire result and no override was requested.
    pub fn apply_classification(
        &mut self,
        outcome: ClassificationOutcome,
        override_questionnaire: bool,
        classified_from: u64,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        if self.is_questionnaire_locked() && !override_questionnaire {
            return Err(DomainError::new(
                ErrorCode::QuestionnaireLocked,
                "Profile was set by questionnaire; automatic classification requires an explicit override",
            )
            .with_detail("user_id", self.user_id.as_str()));
        }
        // a run over older data finishing late must not replace a newer estimate
        if self.is_newer_than(classified_from) {
            return Ok(());
        }

        self.set_estimate(outcome.estimate);
        self.classification.method = outcome.path.method();
        self.classification.model_version = outcome
            .model_version
            .unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string());
        self.classification.fallback_reason = outcome.fallback_reason;
        self.ml_confidence_score = outcome.ml_confidence.map(|c| c.clamp(0.0, 1.0));
        self.classification.classified_interactions = Some(classified_from);
        self.mark_predicted(now);
        Ok(())
    }

    /// True when the stored classification was computed from more
    /// interactions than `classified_from`.
    pub fn is_newer_than(&self, classified_from: u64) -> bool {
        self.classification
            .classified_interactions
            .is_some_and(|stored| stored > classified_from)
    }

    /// Replaces the classification with self-reported scores.
    pub fn apply_questionnaire(&mut self, responses: &QuestionnaireResponses, now: Timestamp) {
        self.set_estimate(responses.score());
        self.classification.method = ClassificationMethod::Questionnaire;
        self.classification.fallback_reason = None;
        self.classification.classified_interactions = None;
        self.ml_confidence_score = None;
        self.mark_predicted(now);
    }

    /// Appends feedback, dropping the oldest entries past the bound.
    pub fn record_feedback(&mut self, feedback: UserFeedback, now: Timestamp) {
        self.user_feedback.push(feedback);
        if self.user_feedback.len() > MAX_FEEDBACK_ENTRIES {
            let excess = self.user_feedback.len() - MAX_FEEDBACK_ENTRIES;
            self.user_feedback.drain(..excess);
        }
        self.touch(now);
    }

    fn set_estimate(&mut self, estimate: StyleEstimate) {
        self.dimensions = estimate.dimensions;
        self.confidence = estimate.confidence;
        self.recommended_modes = recommend_modes(&estimate.dimensions, &estimate.confidence);
    }

    fn mark_predicted(&mut self, now: Timestamp) {
        self.classification.last_prediction = Some(now);
        self.classification.prediction_count = self.classification.prediction_count.saturating_add(1);
        self.touch(now);
    }

    fn touch(&mut self, now: Timestamp) {
        self.version = self.version.increment();
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::BehaviorSessionId;
    use crate::domain::learning::dimensions::FslsmDimension;
    use crate::domain::learning::questionnaire::QuestionnaireAnswer;
    use serde_json::json;

    fn profile() -> LearningStyleProfile {
        LearningStyleProfile::new(UserId::new("learner-1").unwrap(), Timestamp::now())
    }

    fn outcome(path: ClassifierPath) -> ClassificationOutcome {
        ClassificationOutcome {
            estimate: StyleEstimate {
                dimensions: DimensionScores::new(4, 2, -5, 0),
                confidence: DimensionConfidence::uniform(0.7),
            },
            path,
            model_version: None,
            ml_confidence: None,
            fallback_reason: Some("service unavailable".to_string()),
        }
    }

    fn questionnaire() -> QuestionnaireResponses {
        QuestionnaireResponses::new(vec![QuestionnaireAnswer {
            dimension: FslsmDimension::VisualVerbal,
            value: 1,
        }])
        .unwrap()
    }

    #[test]
    fn new_profile_is_unclassified_and_balanced() {
        let profile = profile();

        assert!(!profile.is_classified());
        assert_eq!(profile.dominant_style(), "Balanced");
        assert_eq!(profile.confidence_tier(), ConfidenceTier::Insufficient);
        assert!(profile.needs_update(&Timestamp::now()));
        assert_eq!(profile.classification().model_version, "1.0.0");
    }

    #[test]
    fn apply_classification_overwrites_and_counts() {
        let mut profile = profile();
        let now = Timestamp::now();

        profile.apply_classification(outcome(ClassifierPath::RuleBased), false, 50, now).unwrap();
        profile.apply_classification(outcome(ClassifierPath::MlModel), false, 50, now).unwrap();

        assert!(profile.is_classified());
        assert_eq!(profile.classification().prediction_count, 2);
        assert_eq!(profile.classification().method, ClassificationMethod::MlPrediction);
        assert_eq!(profile.dominant_style(), "Active-Verbal");
        assert_eq!(profile.recommended_modes().len(), 4);
        assert_eq!(profile.classification().last_prediction, Some(now));
        assert!(!profile.needs_update(&now));
    }

    #[test]
    fn outcome_from_older_data_does_not_replace_newer_estimate() {
        let mut profile = profile();
        let newer = ClassificationOutcome {
            estimate: StyleEstimate {
                dimensions: DimensionScores::new(-7, 0, 3, 1),
                confidence: DimensionConfidence::uniform(0.8),
            },
            ..outcome(ClassifierPath::MlModel)
        };
        profile.apply_classification(newer, false, 100, Timestamp::now()).unwrap();
        let before = profile.clone();

        profile
            .apply_classification(outcome(ClassifierPath::RuleBased), false, 50, Timestamp::now())
            .unwrap();

        assert_eq!(profile, before);
        assert_eq!(profile.classification().classified_interactions, Some(100));
        assert_eq!(profile.dimensions(), &DimensionScores::new(-7, 0, 3, 1));
    }

    #[test]
    fn questionnaire_result_blocks_automatic_classification() {
        let mut profile = profile();
        profile.apply_questionnaire(&questionnaire(), Timestamp::now());

        let err = profile
            .apply_classification(outcome(ClassifierPath::RuleBased), false, 50, Timestamp::now())
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::QuestionnaireLocked);
        assert_eq!(profile.classification().method, ClassificationMethod::Questionnaire);
        assert_eq!(profile.confidence().get(FslsmDimension::SensingIntuitive), 1.0);
    }

    #[test]
    fn override_replaces_questionnaire_result() {
        let mut profile = profile();
        profile.apply_questionnaire(&questionnaire(), Timestamp::now());

        profile
            .apply_classification(outcome(ClassifierPath::RuleBased), true, 50, Timestamp::now())
            .unwrap();

        assert_eq!(profile.classification().method, ClassificationMethod::RuleBased);
        assert!(!profile.is_questionnaire_locked());
    }

    #[test]
    fn fold_session_updates_data_quality_and_version() {
        let mut profile = profile();
        let mut record = SessionBehaviorRecord::open(
            profile.user_id().clone(),
            BehaviorSessionId::new("s1").unwrap(),
            Timestamp::now(),
        );
        record.merge(
            serde_json::from_value(json!({
                "modeUsage": { "activeLearning": { "count": 12, "totalTime": 1000 } }
            }))
            .unwrap(),
            Timestamp::now(),
        );
        let before = profile.version();

        let fold = profile.fold_session(&mut record, &DataQualityPolicy::default(), Timestamp::now());

        assert_eq!(fold.current_total, 12);
        assert_eq!(profile.data_quality().total_interactions, 12);
        assert_eq!(profile.data_quality().data_completeness.value(), 60);
        assert!(profile.data_quality().sufficient_for_ml);
        assert!(profile.version() > before);
    }

    #[test]
    fn feedback_is_bounded() {
        let mut profile = profile();
        for _ in 0..(MAX_FEEDBACK_ENTRIES + 3) {
            let feedback = UserFeedback::new(
                RecommendedMode::HandsOnLab,
                true,
                Some(FeedbackRating::new(4).unwrap()),
                None,
                Timestamp::now(),
            )
            .unwrap();
            profile.record_feedback(feedback, Timestamp::now());
        }
        assert_eq!(profile.user_feedback().len(), MAX_FEEDBACK_ENTRIES);
    }

    #[test]
    fn feedback_rating_must_be_one_to_five() {
        assert!(FeedbackRating::new(0).is_err());
        assert!(FeedbackRating::new(6).is_err());
        assert_eq!(FeedbackRating::new(5).unwrap().value(), 5);
    }

    #[test]
    fn blank_comment_is_dropped() {
        let feedback = UserFeedback::new(
            RecommendedMode::AiNarrator,
            false,
            None,
            Some("   ".to_string()),
            Timestamp::now(),
        )
        .unwrap();
        assert!(feedback.comment.is_none());
    }

    #[test]
    fn profile_round_trips_through_json_document() {
        let mut profile = profile();
        profile.apply_questionnaire(&questionnaire(), Timestamp::now());

        let document = serde_json::to_value(&profile).unwrap();
        let restored: LearningStyleProfile = serde_json::from_value(document.clone()).unwrap();

        assert_eq!(restored, profile);
        assert_eq!(document["classification"]["method"], json!("questionnaire"));
    }

    #[test]
    fn mutation_applies_feedback() {
        let mut profile = profile();
        let feedback =
            UserFeedback::new(RecommendedMode::GlobalLearning, true, None, None, Timestamp::now()).unwrap();

        ProfileMutation::RecordFeedback(feedback)
            .apply(&mut profile, Timestamp::now())
            .unwrap();

        assert_eq!(profile.user_feedback().len(), 1);
    }
}
