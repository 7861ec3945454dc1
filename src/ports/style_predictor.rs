//! StylePredictor port - the remote ML prediction service.
//!
//! The service exposes `GET /health` and `POST /predict`. Any failure here
//! is recoverable: the hybrid classifier falls back to rule-based scoring.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::learning::{MlFeatures, StyleEstimate};

/// Health report of the prediction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictorHealth {
    pub status: String,
    pub models_loaded: bool,
    pub version: Option<String>,
}

impl PredictorHealth {
    /// True when the service reports healthy with its models loaded.
    pub fn is_ready(&self) -> bool {
        self.models_loaded && self.status.eq_ignore_ascii_case("healthy")
    }
}

/// A successful prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct StylePrediction {
    pub estimate: StyleEstimate,
    /// Per-axis interpretation text, keyed by axis wire name.
    pub interpretation: HashMap<String, String>,
    pub model_version: Option<String>,
}

/// Prediction service errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    /// The call did not finish within its deadline.
    #[error("prediction service timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Connection refused, DNS failure or similar.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response.
    #[error("prediction service returned status {status}")]
    ServerError { status: u16 },

    /// The service answered with `success: false`.
    #[error("prediction rejected: {0}")]
    Rejected(String),

    /// Response body could not be understood.
    #[error("parse error: {0}")]
    Parse(String),

    /// Health check says the models are not ready.
    #[error("prediction service unhealthy: {0}")]
    Unhealthy(String),
}

impl PredictionError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Short machine-readable reason recorded on the profile.
    pub fn reason_code(&self) -> &'static str {
        match self {
            PredictionError::Timeout { .. } => "timeout",
            PredictionError::Network(_) => "unreachable",
            PredictionError::ServerError { .. } => "server_error",
            PredictionError::Rejected(_) => "rejected",
            PredictionError::Parse(_) => "invalid_response",
            PredictionError::Unhealthy(_) => "unhealthy",
        }
    }
}

/// Remote learning style prediction.
#[async_trait]
pub trait StylePredictor: Send + Sync {
    async fn health(&self) -> Result<PredictorHealth, PredictionError>;

    async fn predict(&self, features: &MlFeatures) -> Result<StylePrediction, PredictionError>;
}
