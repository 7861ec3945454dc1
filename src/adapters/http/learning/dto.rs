//! HTTP DTOs for learning style endpoints.
//!
//! Wire names are camelCase. Successful responses use the
//! `{ "success": true, "data": ... }` envelope; errors use `ErrorResponse`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::application::handlers::learning::{
    BehaviorSummary, ClassificationRun, ClassificationStatus, RecordFeedbackCommand,
    RecordFeedbackResult, TrackBehaviorCommand, TrackBehaviorResult, TriggerClassificationCommand,
};
use crate::domain::foundation::{BehaviorSessionId, DomainError, Timestamp};
use crate::domain::learning::{
    interpret_score, ActivityEngagement, AiAssistantUsage, BehaviorSnapshot, ClassificationMethod,
    ConfidenceTier, DataQuality, DimensionConfidence, DimensionScores, FslsmDimension,
    LearningMode, LearningStyleProfile, ModeRecommendation, ModeUsage, QuestionnaireAnswer,
    RecommendedMode,
};

// ════════════════════════════════════════════════════════════════════════════
// Envelope
// ════════════════════════════════════════════════════════════════════════════

/// Success envelope shared by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /behavior/track`.
///
/// `behaviorData` is kept as raw JSON so that a malformed payload is
/// reported as a validation error instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackBehaviorRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub behavior_data: Option<serde_json::Value>,
}

impl TrackBehaviorRequest {
    pub fn into_command(self) -> Result<TrackBehaviorCommand, DomainError> {
        let session_id = self
            .session_id
            .ok_or_else(|| DomainError::validation("sessionId", "sessionId is required"))?;
        let session_id = BehaviorSessionId::new(session_id)?;

        let raw = match self.behavior_data {
            Some(value) if !value.is_null() => value,
            _ => return Err(DomainError::validation("behaviorData", "behaviorData is required")),
        };
        if !raw.is_object() {
            return Err(DomainError::validation("behaviorData", "behaviorData must be an object"));
        }
        let behavior: BehaviorSnapshot = serde_json::from_value(raw).map_err(|e| {
            DomainError::validation("behaviorData", format!("Invalid behaviorData: {}", e))
        })?;

        Ok(TrackBehaviorCommand { session_id, behavior })
    }
}

/// Body of `POST /style/classify`; the body itself is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyRequest {
    #[serde(default)]
    pub override_questionnaire: bool,
}

impl From<ClassifyRequest> for TriggerClassificationCommand {
    fn from(req: ClassifyRequest) -> Self {
        Self {
            override_questionnaire: req.override_questionnaire,
        }
    }
}

/// Body of `POST /style/questionnaire`.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionnaireRequest {
    pub answers: Vec<QuestionnaireAnswer>,
}

/// Body of `POST /style/feedback`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub recommended_mode: RecommendedMode,
    pub accepted: bool,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl From<FeedbackRequest> for RecordFeedbackCommand {
    fn from(req: FeedbackRequest) -> Self {
        Self {
            recommended_mode: req.recommended_mode,
            accepted: req.accepted,
            rating: req.rating,
            comment: req.comment,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Result of one tracking call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackBehaviorResponse {
    pub total_interactions: u64,
    pub has_sufficient_data: bool,
    /// 0-100
    pub data_completeness: u8,
    pub classification_triggered: bool,
    pub next_milestone: u64,
    pub confidence_level: ConfidenceTier,
}

impl From<TrackBehaviorResult> for TrackBehaviorResponse {
    fn from(result: TrackBehaviorResult) -> Self {
        Self {
            total_interactions: result.total_interactions,
            has_sufficient_data: result.has_sufficient_data,
            data_completeness: result.data_completeness.value(),
            classification_triggered: result.classification_triggered,
            next_milestone: result.next_milestone,
            confidence_level: result.confidence_level,
        }
    }
}

/// Classification readiness.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationStatusResponse {
    pub ready_for_classification: bool,
    pub at_milestone: bool,
    pub total_interactions: u64,
    pub confidence_level: ConfidenceTier,
    pub confidence_percentage: u8,
    pub next_milestone: u64,
    pub message: String,
}

impl From<ClassificationStatus> for ClassificationStatusResponse {
    fn from(status: ClassificationStatus) -> Self {
        Self {
            ready_for_classification: status.ready_for_classification,
            at_milestone: status.at_milestone,
            total_interactions: status.total_interactions,
            confidence_level: status.confidence_level,
            confidence_percentage: status.confidence_percentage,
            next_milestone: status.next_milestone,
            message: status.message,
        }
    }
}

/// Strength and direction of one axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionInterpretation {
    pub score: i8,
    /// Pole the learner leans to; `None` when balanced.
    pub preference: Option<&'static str>,
    pub strength: &'static str,
}

fn interpretations(scores: &DimensionScores) -> BTreeMap<&'static str, DimensionInterpretation> {
    FslsmDimension::ALL
        .iter()
        .map(|dimension| {
            let score = scores.get(*dimension);
            let strength = interpret_score(score);
            let (positive, negative) = dimension.poles();
            let preference = match strength {
                "Balanced" => None,
                _ if score > 0 => Some(positive),
                _ => Some(negative),
            };
            (
                dimension.key(),
                DimensionInterpretation {
                    score,
                    preference,
                    strength,
                },
            )
        })
        .collect()
}

/// Result of an explicit classification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResponse {
    pub dimensions: DimensionScores,
    pub confidence: DimensionConfidence,
    pub recommendations: Vec<ModeRecommendation>,
    pub dominant_style: String,
    /// Classifier branch that ran: `ml_model` or `rule_based`
    pub method: &'static str,
    pub classification_method: ClassificationMethod,
    pub model_version: String,
    pub ml_confidence: Option<f64>,
    pub fallback_reason: Option<String>,
    pub total_interactions: u64,
}

impl From<ClassificationRun> for ClassificationResponse {
    fn from(run: ClassificationRun) -> Self {
        let profile = run.profile;
        Self {
            dimensions: *profile.dimensions(),
            confidence: *profile.confidence(),
            recommendations: profile.recommended_modes().to_vec(),
            dominant_style: profile.dominant_style(),
            method: run.outcome.path.as_str(),
            classification_method: profile.classification().method,
            model_version: profile.classification().model_version.clone(),
            ml_confidence: profile.ml_confidence_score(),
            fallback_reason: profile.classification().fallback_reason.clone(),
            total_interactions: profile.total_interactions(),
        }
    }
}

/// Profile view; `classified` tells which shape follows.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProfileResponse {
    NotClassified(NotClassifiedResponse),
    Classified(Box<ClassifiedProfileResponse>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotClassifiedResponse {
    pub classified: bool,
    pub total_interactions: u64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedProfileResponse {
    pub classified: bool,
    pub dimensions: DimensionScores,
    pub confidence: DimensionConfidence,
    pub interpretations: BTreeMap<&'static str, DimensionInterpretation>,
    pub dominant_style: String,
    pub recommended_modes: Vec<ModeRecommendation>,
    pub classification_method: ClassificationMethod,
    pub model_version: String,
    pub ml_confidence_score: Option<f64>,
    pub confidence_level: ConfidenceTier,
    pub last_prediction: Option<Timestamp>,
    pub prediction_count: u32,
    pub total_interactions: u64,
    pub needs_update: bool,
}

impl ProfileResponse {
    pub fn not_classified(total_interactions: u64) -> Self {
        ProfileResponse::NotClassified(NotClassifiedResponse {
            classified: false,
            total_interactions,
            message: "Learning style not yet classified".to_string(),
        })
    }

    pub fn classified(profile: &LearningStyleProfile, now: &Timestamp) -> Self {
        ProfileResponse::Classified(Box::new(ClassifiedProfileResponse {
            classified: true,
            dimensions: *profile.dimensions(),
            confidence: *profile.confidence(),
            interpretations: interpretations(profile.dimensions()),
            dominant_style: profile.dominant_style(),
            recommended_modes: profile.recommended_modes().to_vec(),
            classification_method: profile.classification().method,
            model_version: profile.classification().model_version.clone(),
            ml_confidence_score: profile.ml_confidence_score(),
            confidence_level: profile.confidence_tier(),
            last_prediction: profile.classification().last_prediction,
            prediction_count: profile.classification().prediction_count,
            total_interactions: profile.total_interactions(),
            needs_update: profile.needs_update(now),
        }))
    }
}

/// Aggregated behavior totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorSummaryResponse {
    pub total_interactions: u64,
    pub sessions_processed: u64,
    pub total_learning_time: u64,
    pub mode_usage: ModeUsage,
    pub most_used_mode: Option<LearningMode>,
    pub ai_assistant_usage: AiAssistantUsage,
    pub average_prompt_length: f64,
    pub activity_engagement: ActivityEngagement,
    pub data_quality: DataQuality,
    pub last_processed_at: Option<Timestamp>,
}

impl From<BehaviorSummary> for BehaviorSummaryResponse {
    fn from(summary: BehaviorSummary) -> Self {
        Self {
            total_interactions: summary.total_interactions,
            sessions_processed: summary.sessions_processed,
            total_learning_time: summary.total_learning_time_ms,
            mode_usage: summary.mode_usage,
            most_used_mode: summary.most_used_mode,
            ai_assistant_usage: summary.ai_assistant_usage,
            average_prompt_length: summary.average_prompt_length,
            activity_engagement: summary.activity_engagement,
            data_quality: summary.data_quality,
            last_processed_at: summary.last_processed_at,
        }
    }
}

/// Questionnaire result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireResponse {
    pub dimensions: DimensionScores,
    pub confidence: DimensionConfidence,
    pub interpretations: BTreeMap<&'static str, DimensionInterpretation>,
    pub dominant_style: String,
    pub recommendations: Vec<ModeRecommendation>,
}

impl From<&LearningStyleProfile> for QuestionnaireResponse {
    fn from(profile: &LearningStyleProfile) -> Self {
        Self {
            dimensions: *profile.dimensions(),
            confidence: *profile.confidence(),
            interpretations: interpretations(profile.dimensions()),
            dominant_style: profile.dominant_style(),
            recommendations: profile.recommended_modes().to_vec(),
        }
    }
}

/// Feedback acknowledgement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub feedback_count: usize,
}

impl From<RecordFeedbackResult> for FeedbackResponse {
    fn from(result: RecordFeedbackResult) -> Self {
        Self {
            feedback_count: result.feedback_count,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    pub fn from_domain(error: &DomainError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.message().to_string(),
            details: (!error.details.is_empty())
                .then(|| error.details.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use serde_json::json;

    fn track_request(value: serde_json::Value) -> TrackBehaviorRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn track_request_builds_command() {
        let cmd = track_request(json!({
            "sessionId": "s1",
            "behaviorData": { "modeUsage": { "visualLearning": { "count": 3, "totalTime": 900 } } }
        }))
        .into_command()
        .unwrap();

        assert_eq!(cmd.session_id.as_str(), "s1");
        assert_eq!(cmd.behavior.mode_usage.unwrap().visual_learning.count, 3);
    }

    #[test]
    fn missing_session_id_is_a_validation_error() {
        let err = track_request(json!({ "behaviorData": {} })).into_command().unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(err.details.get("field").map(String::as_str), Some("sessionId"));
    }

    #[test]
    fn missing_or_null_behavior_data_is_a_validation_error() {
        for body in [json!({ "sessionId": "s1" }), json!({ "sessionId": "s1", "behaviorData": null })] {
            let err = track_request(body).into_command().unwrap_err();
            assert_eq!(err.details.get("field").map(String::as_str), Some("behaviorData"));
        }
    }

    #[test]
    fn non_object_behavior_data_is_rejected() {
        let err = track_request(json!({ "sessionId": "s1", "behaviorData": [1, 2] }))
            .into_command()
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    #[test]
    fn negative_counters_are_clamped_not_rejected() {
        let cmd = track_request(json!({
            "sessionId": "s1",
            "behaviorData": { "modeUsage": { "activeLearning": { "count": -4, "totalTime": 12.7 } } }
        }))
        .into_command()
        .unwrap();

        let usage = cmd.behavior.mode_usage.unwrap();
        assert_eq!(usage.active_learning.count, 0);
        assert_eq!(usage.active_learning.total_time_ms, 12);
    }

    #[test]
    fn interpretations_name_the_leaning_pole() {
        let map = interpretations(&DimensionScores::new(4, 1, -8, 0));

        assert_eq!(map["activeReflective"].preference, Some("Active"));
        assert_eq!(map["activeReflective"].strength, "Moderate preference");
        assert_eq!(map["sensingIntuitive"].preference, None);
        assert_eq!(map["visualVerbal"].preference, Some("Verbal"));
        assert_eq!(map["visualVerbal"].strength, "Very strong preference");
    }

    #[test]
    fn not_classified_profile_serializes_flag() {
        let value = serde_json::to_value(ProfileResponse::not_classified(12)).unwrap();

        assert_eq!(value["classified"], json!(false));
        assert_eq!(value["totalInteractions"], json!(12));
    }

    #[test]
    fn feedback_request_accepts_display_names() {
        let req: FeedbackRequest = serde_json::from_value(json!({
            "recommendedMode": "Hands-On Lab",
            "accepted": false,
            "rating": 2
        }))
        .unwrap();

        assert_eq!(req.recommended_mode, RecommendedMode::HandsOnLab);
        assert_eq!(req.comment, None);
    }

    #[test]
    fn error_response_carries_details() {
        let err = DomainError::validation("sessionId", "sessionId is required");
        let body = ErrorResponse::from_domain(&err);

        assert_eq!(body.code, "VALIDATION_FAILED");
        assert_eq!(body.details.unwrap().get("field").map(String::as_str), Some("sessionId"));
    }
}
