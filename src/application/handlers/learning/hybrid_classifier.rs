//! HybridClassifier - remote ML prediction with rule-based fallback.
//!
//! Order of operations:
//! 1. Too little data for ML → rules
//! 2. Health check (bounded) → rules when unreachable or models not loaded
//! 3. Prediction (bounded) → rules on any failure
//!
//! There are no retries. A fallback is logged and its reason recorded on
//! the outcome; it is never surfaced as an error.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::learning::{
    ClassificationOutcome, ClassifierPath, EngineeredFeatures, RuleBasedClassifier,
};
use crate::ports::{PredictionError, StylePredictor};

/// Reason recorded when the aggregate is below the ML data-quality bar.
pub const INSUFFICIENT_DATA_REASON: &str = "insufficient data for ML prediction";

/// Deadlines applied around each prediction service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HybridClassifierConfig {
    pub health_timeout: Duration,
    pub predict_timeout: Duration,
}

impl Default for HybridClassifierConfig {
    fn default() -> Self {
        Self {
            health_timeout: Duration::from_secs(10),
            predict_timeout: Duration::from_secs(10),
        }
    }
}

/// Classifies engineered features, preferring the prediction service.
pub struct HybridClassifier {
    predictor: Arc<dyn StylePredictor>,
    rules: RuleBasedClassifier,
    config: HybridClassifierConfig,
}

async fn bounded<T, F>(deadline: Duration, call: F) -> Result<T, PredictionError>
where
    F: Future<Output = Result<T, PredictionError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(PredictionError::Timeout {
            timeout_ms: deadline.as_millis() as u64,
        }),
    }
}

impl HybridClassifier {
    pub fn new(predictor: Arc<dyn StylePredictor>, config: HybridClassifierConfig) -> Self {
        Self {
            predictor,
            rules: RuleBasedClassifier::new(),
            config,
        }
    }

    pub async fn classify(&self, features: &EngineeredFeatures) -> ClassificationOutcome {
        if !features.quality.sufficient_for_ml {
            debug!(
                interactions = features.total_interactions(),
                completeness = %features.quality.completeness,
                "Data below ML threshold, using rule-based classification"
            );
            return self.rule_based(features, INSUFFICIENT_DATA_REASON.to_string());
        }

        match self.predict(features).await {
            Ok(outcome) => {
                info!(
                    model_version = ?outcome.model_version,
                    ml_confidence = ?outcome.ml_confidence,
                    "ML classification succeeded"
                );
                outcome
            }
            Err(err) => {
                warn!(
                    reason = err.reason_code(),
                    error = %err,
                    "ML classification unavailable, falling back to rule-based"
                );
                self.rule_based(features, err.to_string())
            }
        }
    }

    async fn predict(&self, features: &EngineeredFeatures) -> Result<ClassificationOutcome, PredictionError> {
        let health = bounded(self.config.health_timeout, self.predictor.health()).await?;
        if !health.is_ready() {
            return Err(PredictionError::Unhealthy(format!(
                "status '{}', models loaded: {}",
                health.status, health.models_loaded
            )));
        }

        let prediction = bounded(self.config.predict_timeout, self.predictor.predict(&features.ml)).await?;

        Ok(ClassificationOutcome {
            ml_confidence: Some(prediction.estimate.confidence.mean()),
            estimate: prediction.estimate,
            path: ClassifierPath::MlModel,
            model_version: prediction.model_version.or(health.version),
            fallback_reason: None,
        })
    }

    fn rule_based(&self, features: &EngineeredFeatures, reason: String) -> ClassificationOutcome {
        ClassificationOutcome {
            estimate: self.rules.classify(features),
            path: ClassifierPath::RuleBased,
            model_version: None,
            ml_confidence: None,
            fallback_reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ml::MockStylePredictor;
    use crate::domain::foundation::{BehaviorSessionId, Timestamp, UserId};
    use crate::domain::learning::{
        engineer_features, AggregatedStats, DimensionConfidence, DimensionScores, SessionBehaviorRecord,
        StyleEstimate,
    };
    use serde_json::json;

    fn rich_features() -> EngineeredFeatures {
        let mut record = SessionBehaviorRecord::open(
            UserId::new("learner-1").unwrap(),
            BehaviorSessionId::new("s1").unwrap(),
            Timestamp::now(),
        );
        record.merge(
            serde_json::from_value(json!({
                "modeUsage": { "visualLearning": { "count": 30, "totalTime": 400000 } }
            }))
            .unwrap(),
            Timestamp::now(),
        );
        let mut stats = AggregatedStats::default();
        stats.fold(&mut record, Timestamp::now());
        engineer_features(&stats)
    }

    fn ml_estimate() -> StyleEstimate {
        StyleEstimate {
            dimensions: DimensionScores::new(-6, 0, 2, 9),
            confidence: DimensionConfidence::uniform(0.5),
        }
    }

    fn classifier(predictor: Arc<MockStylePredictor>) -> HybridClassifier {
        HybridClassifier::new(
            predictor,
            HybridClassifierConfig {
                health_timeout: Duration::from_millis(200),
                predict_timeout: Duration::from_millis(50),
            },
        )
    }

    #[tokio::test]
    async fn healthy_service_prediction_is_used() {
        let predictor = Arc::new(MockStylePredictor::returning(ml_estimate()));

        let outcome = classifier(predictor.clone()).classify(&rich_features()).await;

        assert_eq!(outcome.path, ClassifierPath::MlModel);
        assert_eq!(outcome.estimate, ml_estimate());
        assert_eq!(outcome.ml_confidence, Some(0.5));
        assert_eq!(outcome.model_version.as_deref(), Some("mock-1"));
        assert!(outcome.fallback_reason.is_none());
        assert_eq!(predictor.predict_calls(), 1);
    }

    #[tokio::test]
    async fn server_error_falls_back_without_retry() {
        let predictor = Arc::new(MockStylePredictor::failing(PredictionError::ServerError { status: 500 }));

        let outcome = classifier(predictor.clone()).classify(&rich_features()).await;

        assert_eq!(outcome.path, ClassifierPath::RuleBased);
        assert_eq!(
            outcome.fallback_reason.as_deref(),
            Some("prediction service returned status 500")
        );
        assert_eq!(predictor.predict_calls(), 1);
    }

    #[tokio::test]
    async fn slow_prediction_times_out_and_falls_back() {
        let predictor = Arc::new(MockStylePredictor::slow(Duration::from_secs(5), ml_estimate()));

        let started = std::time::Instant::now();
        let outcome = classifier(predictor).classify(&rich_features()).await;

        assert_eq!(outcome.path, ClassifierPath::RuleBased);
        assert!(outcome.fallback_reason.unwrap().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn unhealthy_service_is_not_asked_to_predict() {
        let predictor = Arc::new(MockStylePredictor::unhealthy());

        let outcome = classifier(predictor.clone()).classify(&rich_features()).await;

        assert_eq!(outcome.path, ClassifierPath::RuleBased);
        assert_eq!(predictor.health_calls(), 1);
        assert_eq!(predictor.predict_calls(), 0);
    }

    #[tokio::test]
    async fn insufficient_data_skips_the_service() {
        let predictor = Arc::new(MockStylePredictor::returning(ml_estimate()));

        let outcome = classifier(predictor.clone())
            .classify(&engineer_features(&AggregatedStats::default()))
            .await;

        assert_eq!(outcome.path, ClassifierPath::RuleBased);
        assert_eq!(outcome.fallback_reason.as_deref(), Some(INSUFFICIENT_DATA_REASON));
        assert_eq!(outcome.estimate, StyleEstimate::default());
        assert_eq!(predictor.health_calls(), 0);
    }
}
