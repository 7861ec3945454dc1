//! ClassificationRunner - features, hybrid classification, atomic apply.
//!
//! Shared by the tracking pipeline (milestone-triggered) and the explicit
//! classify endpoint.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::domain::learning::{
    engineer_features, ClassificationOutcome, LearningStyleProfile, ProfileMutation,
};
use crate::ports::LearningProfileRepository;

use super::hybrid_classifier::HybridClassifier;

/// Profile after a classification, plus what produced it.
#[derive(Debug, Clone)]
pub struct ClassificationRun {
    pub profile: LearningStyleProfile,
    pub outcome: ClassificationOutcome,
}

pub struct ClassificationRunner {
    profiles: Arc<dyn LearningProfileRepository>,
    classifier: Arc<HybridClassifier>,
}

impl ClassificationRunner {
    pub fn new(profiles: Arc<dyn LearningProfileRepository>, classifier: Arc<HybridClassifier>) -> Self {
        Self { profiles, classifier }
    }

    /// Classifies the user's current aggregate and stores the result.
    ///
    /// Fails with `QuestionnaireLocked` before any classifier work when the
    /// profile holds questionnaire results and no override was requested.
    pub async fn run(
        &self,
        user_id: &UserId,
        override_questionnaire: bool,
    ) -> Result<ClassificationRun, DomainError> {
        let profile = self.profiles.get_or_create(user_id, Timestamp::now()).await?;
        if profile.is_questionnaire_locked() && !override_questionnaire {
            return Err(DomainError::new(
                ErrorCode::QuestionnaireLocked,
                "Profile was set by questionnaire; pass overrideQuestionnaire to reclassify",
            ));
        }

        let features = engineer_features(profile.aggregated_stats());
        let classified_from = features.total_interactions();
        let outcome = self.classifier.classify(&features).await;

        // the aggregate may have grown while classifying; apply only replaces
        // classification fields, so nothing tracked in between is lost
        let profile = self
            .profiles
            .update_with(
                user_id,
                ProfileMutation::ApplyClassification {
                    outcome: outcome.clone(),
                    override_questionnaire,
                    classified_from,
                },
                Timestamp::now(),
            )
            .await?;

        if profile.is_newer_than(classified_from) {
            debug!(
                user_id = %user_id,
                classified_from,
                stored = ?profile.classification().classified_interactions,
                "Discarded classification superseded by a newer run"
            );
            return Ok(ClassificationRun { profile, outcome });
        }

        info!(
            user_id = %user_id,
            method = outcome.path.as_str(),
            dominant_style = %profile.dominant_style(),
            total_interactions = classified_from,
            prediction_count = profile.classification().prediction_count,
            "Learning style classified"
        );

        Ok(ClassificationRun { profile, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::learning::InMemoryLearningStore;
    use crate::adapters::ml::MockStylePredictor;
    use crate::application::handlers::learning::HybridClassifierConfig;
    use crate::domain::foundation::BehaviorSessionId;
    use crate::domain::learning::{
        ClassificationMethod, ClassifierPath, DataQualityPolicy, DimensionConfidence, DimensionScores,
        StyleEstimate,
    };
    use crate::ports::BehaviorStore;
    use serde_json::json;

    fn user() -> UserId {
        UserId::new("learner-1").unwrap()
    }

    fn runner(store: &InMemoryLearningStore, predictor: MockStylePredictor) -> ClassificationRunner {
        let classifier = HybridClassifier::new(Arc::new(predictor), HybridClassifierConfig::default());
        ClassificationRunner::new(Arc::new(store.clone()), Arc::new(classifier))
    }

    async fn track(store: &InMemoryLearningStore, visual: u64) {
        store
            .record_and_fold(
                &user(),
                &BehaviorSessionId::new("s1").unwrap(),
                serde_json::from_value(json!({
                    "modeUsage": { "visualLearning": { "count": visual, "totalTime": 60000 } }
                }))
                .unwrap(),
                &DataQualityPolicy::default(),
                Timestamp::now(),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn ml_result_is_stored_on_profile() {
        let store = InMemoryLearningStore::new();
        track(&store, 40).await;
        let estimate = StyleEstimate {
            dimensions: DimensionScores::new(4, 2, -5, 0),
            confidence: DimensionConfidence::uniform(0.5),
        };

        let run = runner(&store, MockStylePredictor::returning(estimate)).run(&user(), false).await.unwrap();

        assert_eq!(run.profile.dimensions(), &estimate.dimensions);
        assert_eq!(run.profile.dominant_style(), "Active-Verbal");
        assert_eq!(run.profile.classification().method, ClassificationMethod::MlPrediction);
        assert_eq!(run.profile.classification().model_version, "mock-1");
        assert_eq!(run.profile.ml_confidence_score(), Some(0.5));
        assert_eq!(run.profile.total_interactions(), 40);
    }

    #[tokio::test]
    async fn fallback_reason_is_recorded() {
        let store = InMemoryLearningStore::new();
        track(&store, 40).await;

        let run = runner(&store, MockStylePredictor::unhealthy()).run(&user(), false).await.unwrap();

        assert_eq!(run.profile.classification().method, ClassificationMethod::RuleBased);
        assert!(run.profile.classification().fallback_reason.is_some());
        assert_eq!(run.profile.ml_confidence_score(), None);
    }

    #[tokio::test]
    async fn classification_keeps_aggregate_intact() {
        let store = InMemoryLearningStore::new();
        track(&store, 40).await;
        let before = store.find_by_user(&user()).await.unwrap().unwrap();

        let run = runner(&store, MockStylePredictor::unhealthy()).run(&user(), false).await.unwrap();

        assert_eq!(run.profile.aggregated_stats(), before.aggregated_stats());
        assert_eq!(run.profile.data_quality(), before.data_quality());
        assert!(run.profile.version() > before.version());
    }

    #[tokio::test]
    async fn late_run_over_older_data_keeps_newer_classification() {
        let store = InMemoryLearningStore::new();
        track(&store, 40).await;
        let newer = StyleEstimate {
            dimensions: DimensionScores::new(-6, 0, 0, 2),
            confidence: DimensionConfidence::uniform(0.9),
        };
        store
            .update_with(
                &user(),
                ProfileMutation::ApplyClassification {
                    outcome: ClassificationOutcome {
                        estimate: newer,
                        path: ClassifierPath::MlModel,
                        model_version: Some("mock-1".to_string()),
                        ml_confidence: Some(0.9),
                        fallback_reason: None,
                    },
                    override_questionnaire: false,
                    classified_from: 100,
                },
                Timestamp::now(),
            )
            .await
            .unwrap();

        let run = runner(&store, MockStylePredictor::unhealthy()).run(&user(), false).await.unwrap();

        assert_eq!(run.outcome.path, ClassifierPath::RuleBased);
        assert_eq!(run.profile.dimensions(), &newer.dimensions);
        assert_eq!(run.profile.classification().method, ClassificationMethod::MlPrediction);
        assert_eq!(run.profile.classification().prediction_count, 1);
    }
}
