//! Route definitions for learning style endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    get_behavior_summary, get_classification_status, get_learning_profile, record_feedback,
    submit_questionnaire, track_behavior, trigger_classification, LearningHandlers,
};

/// Learning routes, mounted under `/api/learning`.
///
/// - `POST /behavior/track`
/// - `GET  /behavior/summary`
/// - `GET  /style/classify` (readiness) / `POST /style/classify` (run)
/// - `GET  /style/profile`
/// - `POST /style/questionnaire`
/// - `POST /style/feedback`
pub fn learning_routes(handlers: LearningHandlers) -> Router {
    Router::new()
        .route("/behavior/track", post(track_behavior))
        .route("/behavior/summary", get(get_behavior_summary))
        .route(
            "/style/classify",
            get(get_classification_status).post(trigger_classification),
        )
        .route("/style/profile", get(get_learning_profile))
        .route("/style/questionnaire", post(submit_questionnaire))
        .route("/style/feedback", post(record_feedback))
        .with_state(handlers)
}
