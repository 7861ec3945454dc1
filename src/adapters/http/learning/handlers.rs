//! HTTP handlers for learning style endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::adapters::http::middleware::RequireAuth;
use crate::application::handlers::learning::{
    GetBehaviorSummaryHandler, GetBehaviorSummaryQuery, GetClassificationStatusHandler,
    GetClassificationStatusQuery, GetLearningProfileHandler, GetLearningProfileQuery,
    LearningProfileView, RecordFeedbackHandler, SubmitQuestionnaireCommand,
    SubmitQuestionnaireHandler, TrackBehaviorHandler, TriggerClassificationHandler,
};
use crate::domain::foundation::{AuthenticatedUser, CommandMetadata, DomainError, ErrorCode, Timestamp};

use super::dto::{
    ApiResponse, BehaviorSummaryResponse, ClassificationResponse, ClassificationStatusResponse,
    ClassifyRequest, ErrorResponse, FeedbackRequest, FeedbackResponse, ProfileResponse,
    QuestionnaireRequest, QuestionnaireResponse, TrackBehaviorRequest, TrackBehaviorResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct LearningHandlers {
    track_handler: Arc<TrackBehaviorHandler>,
    status_handler: Arc<GetClassificationStatusHandler>,
    classify_handler: Arc<TriggerClassificationHandler>,
    profile_handler: Arc<GetLearningProfileHandler>,
    summary_handler: Arc<GetBehaviorSummaryHandler>,
    questionnaire_handler: Arc<SubmitQuestionnaireHandler>,
    feedback_handler: Arc<RecordFeedbackHandler>,
}

impl LearningHandlers {
    pub fn new(
        track_handler: Arc<TrackBehaviorHandler>,
        status_handler: Arc<GetClassificationStatusHandler>,
        classify_handler: Arc<TriggerClassificationHandler>,
        profile_handler: Arc<GetLearningProfileHandler>,
        summary_handler: Arc<GetBehaviorSummaryHandler>,
        questionnaire_handler: Arc<SubmitQuestionnaireHandler>,
        feedback_handler: Arc<RecordFeedbackHandler>,
    ) -> Self {
        Self {
            track_handler,
            status_handler,
            classify_handler,
            profile_handler,
            summary_handler,
            questionnaire_handler,
            feedback_handler,
        }
    }
}

/// Command metadata correlated with the request id set by the tower layer.
fn metadata_for(user: &AuthenticatedUser, headers: &HeaderMap) -> CommandMetadata {
    let metadata = CommandMetadata::new(user.id.clone()).with_source("http");
    match headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        Some(request_id) => metadata.with_correlation_id(request_id),
        None => metadata,
    }
}

fn ok<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(ApiResponse::ok(data))).into_response()
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/learning/behavior/track - Record a behavior snapshot
pub async fn track_behavior(
    State(handlers): State<LearningHandlers>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    body: Result<Json<TrackBehaviorRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return handle_json_rejection(rejection),
    };
    let cmd = match req.into_command() {
        Ok(cmd) => cmd,
        Err(e) => return handle_learning_error(e),
    };

    match handlers.track_handler.handle(cmd, metadata_for(&user, &headers)).await {
        Ok(result) => ok(StatusCode::OK, TrackBehaviorResponse::from(result)),
        Err(e) => handle_learning_error(e),
    }
}

/// GET /api/learning/behavior/summary - Aggregated behavior totals
pub async fn get_behavior_summary(
    State(handlers): State<LearningHandlers>,
    RequireAuth(user): RequireAuth,
) -> Response {
    let query = GetBehaviorSummaryQuery { user_id: user.id };

    match handlers.summary_handler.handle(query).await {
        Ok(summary) => ok(StatusCode::OK, BehaviorSummaryResponse::from(summary)),
        Err(e) => handle_learning_error(e),
    }
}

/// GET /api/learning/style/classify - Classification readiness
pub async fn get_classification_status(
    State(handlers): State<LearningHandlers>,
    RequireAuth(user): RequireAuth,
) -> Response {
    let query = GetClassificationStatusQuery { user_id: user.id };

    match handlers.status_handler.handle(query).await {
        Ok(status) => ok(StatusCode::OK, ClassificationStatusResponse::from(status)),
        Err(e) => handle_learning_error(e),
    }
}

/// POST /api/learning/style/classify - Classify now
///
/// The body is optional; an empty body classifies without overriding a
/// questionnaire result.
pub async fn trigger_classification(
    State(handlers): State<LearningHandlers>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        ClassifyRequest::default()
    } else {
        match serde_json::from_slice::<ClassifyRequest>(&body) {
            Ok(req) => req,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::from_domain(&DomainError::new(
                        ErrorCode::InvalidFormat,
                        format!("Invalid request body: {}", e),
                    ))),
                )
                    .into_response()
            }
        }
    };

    match handlers.classify_handler.handle(req.into(), metadata_for(&user, &headers)).await {
        Ok(run) => ok(StatusCode::OK, ClassificationResponse::from(run)),
        Err(e) => handle_learning_error(e),
    }
}

/// GET /api/learning/style/profile - Current learning style profile
pub async fn get_learning_profile(
    State(handlers): State<LearningHandlers>,
    RequireAuth(user): RequireAuth,
) -> Response {
    let query = GetLearningProfileQuery { user_id: user.id };

    match handlers.profile_handler.handle(query).await {
        Ok(LearningProfileView::NotClassified { total_interactions }) => {
            ok(StatusCode::OK, ProfileResponse::not_classified(total_interactions))
        }
        Ok(LearningProfileView::Classified(profile)) => {
            ok(StatusCode::OK, ProfileResponse::classified(&profile, &Timestamp::now()))
        }
        Err(e) => handle_learning_error(e),
    }
}

/// POST /api/learning/style/questionnaire - Apply questionnaire answers
pub async fn submit_questionnaire(
    State(handlers): State<LearningHandlers>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    body: Result<Json<QuestionnaireRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return handle_json_rejection(rejection),
    };
    let cmd = SubmitQuestionnaireCommand { answers: req.answers };

    match handlers.questionnaire_handler.handle(cmd, metadata_for(&user, &headers)).await {
        Ok(profile) => ok(StatusCode::OK, QuestionnaireResponse::from(&profile)),
        Err(e) => handle_learning_error(e),
    }
}

/// POST /api/learning/style/feedback - Rate a recommendation
pub async fn record_feedback(
    State(handlers): State<LearningHandlers>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    body: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return handle_json_rejection(rejection),
    };

    match handlers.feedback_handler.handle(req.into(), metadata_for(&user, &headers)).await {
        Ok(result) => ok(StatusCode::CREATED, FeedbackResponse::from(result)),
        Err(e) => handle_learning_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed
        | ErrorCode::EmptyField
        | ErrorCode::OutOfRange
        | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::ProfileNotFound | ErrorCode::BehaviorSessionNotFound => StatusCode::NOT_FOUND,
        ErrorCode::QuestionnaireLocked | ErrorCode::ConcurrentModification => StatusCode::CONFLICT,
        ErrorCode::DatabaseError => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::ClassificationFailed | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn handle_learning_error(error: DomainError) -> Response {
    let status = status_for(error.code());
    if status.is_server_error() {
        error!(code = %error.code(), error = %error, "Learning request failed");
        // storage and internal messages stay in the logs
        let body = ErrorResponse {
            code: error.code().to_string(),
            ..ErrorResponse::internal("Learning service error")
        };
        return (status, Json(body)).into_response();
    }
    (status, Json(ErrorResponse::from_domain(&error))).into_response()
}

fn handle_json_rejection(rejection: JsonRejection) -> Response {
    let error = DomainError::new(ErrorCode::InvalidFormat, rejection.body_text());
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::from_domain(&error))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_codes_map_to_bad_request() {
        for code in [
            ErrorCode::ValidationFailed,
            ErrorCode::EmptyField,
            ErrorCode::OutOfRange,
            ErrorCode::InvalidFormat,
        ] {
            assert_eq!(status_for(code), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn questionnaire_lock_is_a_conflict() {
        assert_eq!(status_for(ErrorCode::QuestionnaireLocked), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::ConcurrentModification), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_failure_is_service_unavailable() {
        assert_eq!(status_for(ErrorCode::DatabaseError), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_for(ErrorCode::InternalError), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_codes_keep_their_status() {
        assert_eq!(status_for(ErrorCode::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorCode::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorCode::ProfileNotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn server_errors_hide_the_message() {
        let response = handle_learning_error(DomainError::database("connection refused to 10.0.0.3"));

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
