//! HTTP client for the FSLSM prediction service.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::learning::{DimensionConfidence, DimensionScores, FslsmDimension, MlFeatures, StyleEstimate};
use crate::ports::{PredictionError, PredictorHealth, StylePrediction, StylePredictor};

/// Configuration for the prediction service client.
#[derive(Debug, Clone)]
pub struct PredictionServiceConfig {
    /// Base URL of the service (default: http://localhost:5000).
    pub base_url: String,
    /// Deadline for `GET /health`.
    pub health_timeout: Duration,
    /// Deadline for `POST /predict`.
    pub predict_timeout: Duration,
}

impl Default for PredictionServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            health_timeout: Duration::from_secs(10),
            predict_timeout: Duration::from_secs(10),
        }
    }
}

impl PredictionServiceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeouts(mut self, health: Duration, predict: Duration) -> Self {
        self.health_timeout = health;
        self.predict_timeout = predict;
        self
    }
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    #[serde(default)]
    status: String,
    #[serde(default)]
    models_loaded: bool,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Serialize)]
struct PredictBody<'a> {
    features: &'a MlFeatures,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    predictions: HashMap<String, f64>,
    #[serde(default)]
    confidence: HashMap<String, f64>,
    #[serde(default)]
    interpretation: HashMap<String, String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

impl PredictResponse {
    fn into_prediction(self) -> Result<StylePrediction, PredictionError> {
        if !self.success {
            return Err(PredictionError::Rejected(
                self.error.unwrap_or_else(|| "prediction unsuccessful".to_string()),
            ));
        }

        let score = |dimension: FslsmDimension| -> Result<f64, PredictionError> {
            self.predictions
                .get(dimension.key())
                .copied()
                .ok_or_else(|| PredictionError::parse(format!("missing prediction for {}", dimension.key())))
        };
        let confidence = |dimension: FslsmDimension| self.confidence.get(dimension.key()).copied().unwrap_or(0.0);

        let estimate = StyleEstimate {
            dimensions: DimensionScores::from_raw(
                score(FslsmDimension::ActiveReflective)?,
                score(FslsmDimension::SensingIntuitive)?,
                score(FslsmDimension::VisualVerbal)?,
                score(FslsmDimension::SequentialGlobal)?,
            ),
            confidence: DimensionConfidence::new(
                confidence(FslsmDimension::ActiveReflective),
                confidence(FslsmDimension::SensingIntuitive),
                confidence(FslsmDimension::VisualVerbal),
                confidence(FslsmDimension::SequentialGlobal),
            ),
        };

        Ok(StylePrediction {
            estimate,
            interpretation: self.interpretation,
            model_version: self.version,
        })
    }
}

/// Prediction service reached over HTTP.
pub struct HttpStylePredictor {
    config: PredictionServiceConfig,
    client: Client,
}

impl HttpStylePredictor {
    pub fn new(config: PredictionServiceConfig) -> Result<Self, PredictionError> {
        let client = Client::builder()
            .timeout(config.health_timeout.max(config.predict_timeout))
            .build()
            .map_err(|e| PredictionError::network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn map_send_error(err: reqwest::Error, timeout: Duration) -> PredictionError {
        if err.is_timeout() {
            PredictionError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }
        } else if err.is_connect() {
            PredictionError::network(format!("Connection failed: {}", err))
        } else {
            PredictionError::network(err.to_string())
        }
    }

    fn check_status(response: Response) -> Result<Response, PredictionError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(PredictionError::ServerError {
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl StylePredictor for HttpStylePredictor {
    async fn health(&self) -> Result<PredictorHealth, PredictionError> {
        let timeout = self.config.health_timeout;
        let response = self
            .client
            .get(self.url("/health"))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, timeout))?;

        let body: HealthBody = Self::check_status(response)?
            .json()
            .await
            .map_err(|e| PredictionError::parse(format!("Failed to parse health response: {}", e)))?;

        Ok(PredictorHealth {
            status: body.status,
            models_loaded: body.models_loaded,
            version: body.version,
        })
    }

    async fn predict(&self, features: &MlFeatures) -> Result<StylePrediction, PredictionError> {
        let timeout = self.config.predict_timeout;
        let response = self
            .client
            .post(self.url("/predict"))
            .timeout(timeout)
            .json(&PredictBody { features })
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, timeout))?;

        let body: PredictResponse = Self::check_status(response)?
            .json()
            .await
            .map_err(|e| PredictionError::parse(format!("Failed to parse prediction response: {}", e)))?;

        body.into_prediction()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> PredictResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn successful_response_maps_scores_and_confidence() {
        let prediction = response(json!({
            "success": true,
            "predictions": { "activeReflective": 5, "sensingIntuitive": -2, "visualVerbal": 14.4, "sequentialGlobal": 0 },
            "confidence": { "activeReflective": 0.8, "sensingIntuitive": 0.4, "visualVerbal": 1.7, "sequentialGlobal": 0.1 },
            "interpretation": { "activeReflective": "Moderate preference" }
        }))
        .into_prediction()
        .unwrap();

        let scores = prediction.estimate.dimensions;
        assert_eq!(scores.get(FslsmDimension::ActiveReflective), 5);
        assert_eq!(scores.get(FslsmDimension::VisualVerbal), 11);
        assert_eq!(prediction.estimate.confidence.get(FslsmDimension::VisualVerbal), 1.0);
        assert_eq!(
            prediction.interpretation.get("activeReflective").map(String::as_str),
            Some("Moderate preference")
        );
    }

    #[test]
    fn unsuccessful_response_is_rejected() {
        let err = response(json!({ "success": false, "error": "Models not loaded" }))
            .into_prediction()
            .unwrap_err();
        assert_eq!(err, PredictionError::Rejected("Models not loaded".to_string()));
    }

    #[test]
    fn missing_dimension_is_a_parse_error() {
        let err = response(json!({ "success": true, "predictions": { "activeReflective": 1 } }))
            .into_prediction()
            .unwrap_err();
        assert!(matches!(err, PredictionError::Parse(_)));
    }

    #[test]
    fn features_are_wrapped_in_features_field() {
        let features = MlFeatures::default();
        let body = serde_json::to_value(PredictBody { features: &features }).unwrap();
        assert!(body["features"]["activeModeRatio"].is_number());
        assert_eq!(body["features"].as_object().unwrap().len(), 24);
    }

    #[test]
    fn url_joins_without_double_slash() {
        let predictor = HttpStylePredictor::new(PredictionServiceConfig::new("http://ml:5000/")).unwrap();
        assert_eq!(predictor.url("/health"), "http://ml:5000/health");
    }
}
