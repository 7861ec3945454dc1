//! Mock prediction service for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::domain::learning::{MlFeatures, StyleEstimate};
use crate::ports::{PredictionError, PredictorHealth, StylePrediction, StylePredictor};

#[derive(Debug, Clone)]
enum Behavior {
    Predict(StyleEstimate),
    Unhealthy,
    FailPredict(PredictionError),
    Slow(Duration, StyleEstimate),
}

/// Configurable stand-in for the prediction service.
#[derive(Debug)]
pub struct MockStylePredictor {
    behavior: Behavior,
    health_calls: AtomicUsize,
    predict_calls: AtomicUsize,
}

impl MockStylePredictor {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            health_calls: AtomicUsize::new(0),
            predict_calls: AtomicUsize::new(0),
        }
    }

    /// Healthy service that always returns `estimate`.
    pub fn returning(estimate: StyleEstimate) -> Self {
        Self::with_behavior(Behavior::Predict(estimate))
    }

    /// Health check reports the models as not loaded.
    pub fn unhealthy() -> Self {
        Self::with_behavior(Behavior::Unhealthy)
    }

    /// Healthy, but every prediction fails with `error`.
    pub fn failing(error: PredictionError) -> Self {
        Self::with_behavior(Behavior::FailPredict(error))
    }

    /// Healthy, but predictions take `delay` before answering.
    pub fn slow(delay: Duration, estimate: StyleEstimate) -> Self {
        Self::with_behavior(Behavior::Slow(delay, estimate))
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn predict_calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }

    fn prediction(estimate: StyleEstimate) -> StylePrediction {
        StylePrediction {
            estimate,
            interpretation: HashMap::new(),
            model_version: Some("mock-1".to_string()),
        }
    }
}

#[async_trait]
impl StylePredictor for MockStylePredictor {
    async fn health(&self) -> Result<PredictorHealth, PredictionError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        let loaded = !matches!(self.behavior, Behavior::Unhealthy);
        Ok(PredictorHealth {
            status: if loaded { "healthy" } else { "unhealthy" }.to_string(),
            models_loaded: loaded,
            version: Some("mock-1".to_string()),
        })
    }

    async fn predict(&self, _features: &MlFeatures) -> Result<StylePrediction, PredictionError> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Predict(estimate) => Ok(Self::prediction(*estimate)),
            Behavior::Unhealthy => Err(PredictionError::Rejected("Models not loaded".to_string())),
            Behavior::FailPredict(error) => Err(error.clone()),
            Behavior::Slow(delay, estimate) => {
                tokio::time::sleep(*delay).await;
                Ok(Self::prediction(*estimate))
            }
        }
    }
}
