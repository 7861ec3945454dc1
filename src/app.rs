//! Service wiring shared by the binary and the integration tests.

use std::sync::Arc;

use crate::adapters::http::{api_router, AuthState, LearningHandlers};
use crate::application::handlers::learning::{
    ClassificationRunner, GetBehaviorSummaryHandler, GetClassificationStatusHandler,
    GetLearningProfileHandler, HybridClassifier, HybridClassifierConfig,
    PurgeExpiredBehaviorHandler, RecordFeedbackHandler, SubmitQuestionnaireHandler,
    TrackBehaviorHandler, TrackingPolicy, TriggerClassificationHandler,
};
use crate::config::AppConfig;
use crate::ports::{BehaviorStore, LearningProfileRepository, SessionValidator, StylePredictor};

/// Everything the HTTP surface and the retention sweep need.
#[derive(Clone)]
pub struct LearningServices {
    pub handlers: LearningHandlers,
    pub purge: Arc<PurgeExpiredBehaviorHandler>,
}

impl LearningServices {
    /// Wires every handler over one store that serves both persistence ports.
    pub fn build<S>(store: S, predictor: Arc<dyn StylePredictor>, config: &AppConfig) -> Self
    where
        S: BehaviorStore + LearningProfileRepository + Clone + 'static,
    {
        let behavior: Arc<dyn BehaviorStore> = Arc::new(store.clone());
        let profiles: Arc<dyn LearningProfileRepository> = Arc::new(store);

        let classifier = Arc::new(HybridClassifier::new(
            predictor,
            HybridClassifierConfig {
                health_timeout: config.ml_service.health_timeout(),
                predict_timeout: config.ml_service.predict_timeout(),
            },
        ));
        let runner = Arc::new(ClassificationRunner::new(profiles.clone(), classifier));
        let policy = TrackingPolicy {
            data_quality: config.classification.data_quality_policy(),
            background_classification: config.classification.background,
        };

        let handlers = LearningHandlers::new(
            Arc::new(TrackBehaviorHandler::new(behavior.clone(), runner.clone(), policy)),
            Arc::new(GetClassificationStatusHandler::new(
                profiles.clone(),
                config.classification.tier_percentages(),
            )),
            Arc::new(TriggerClassificationHandler::new(runner)),
            Arc::new(GetLearningProfileHandler::new(profiles.clone())),
            Arc::new(GetBehaviorSummaryHandler::new(profiles.clone())),
            Arc::new(SubmitQuestionnaireHandler::new(profiles.clone())),
            Arc::new(RecordFeedbackHandler::new(profiles)),
        );

        Self {
            handlers,
            purge: Arc::new(PurgeExpiredBehaviorHandler::new(behavior, config.retention.days)),
        }
    }

    /// Full axum router with token authentication.
    pub fn router(&self, validator: Arc<dyn SessionValidator>, config: &AppConfig) -> axum::Router {
        api_router(
            self.handlers.clone(),
            AuthState::new(validator, config.auth.cookie_name.clone()),
        )
    }
}
