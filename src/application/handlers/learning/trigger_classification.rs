//! TriggerClassification - Command handler for on-demand classification.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{CommandMetadata, DomainError};

use super::classification_runner::{ClassificationRun, ClassificationRunner};

/// Command to classify the acting user right now.
#[derive(Debug, Clone, Default)]
pub struct TriggerClassificationCommand {
    /// Replace a questionnaire result.
    pub override_questionnaire: bool,
}

pub type TriggerClassificationResult = ClassificationRun;

/// Handler for explicit classification requests.
///
/// Runs synchronously, regardless of where it falls relative to the
/// milestones.
pub struct TriggerClassificationHandler {
    runner: Arc<ClassificationRunner>,
}

impl TriggerClassificationHandler {
    pub fn new(runner: Arc<ClassificationRunner>) -> Self {
        Self { runner }
    }

    pub async fn handle(
        &self,
        cmd: TriggerClassificationCommand,
        metadata: CommandMetadata,
    ) -> Result<TriggerClassificationResult, DomainError> {
        info!(
            user_id = %metadata.user_id,
            correlation_id = %metadata.correlation_id(),
            override_questionnaire = cmd.override_questionnaire,
            "Classification requested"
        );
        self.runner
            .run(&metadata.user_id, cmd.override_questionnaire)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::learning::InMemoryLearningStore;
    use crate::adapters::ml::MockStylePredictor;
    use crate::application::handlers::learning::{HybridClassifier, HybridClassifierConfig};
    use crate::domain::foundation::{ErrorCode, Timestamp, UserId};
    use crate::domain::learning::{
        ClassificationMethod, ClassifierPath, FslsmDimension, ProfileMutation, QuestionnaireAnswer,
        QuestionnaireResponses, StyleEstimate,
    };
    use crate::ports::LearningProfileRepository;

    fn user() -> UserId {
        UserId::new("learner-1").unwrap()
    }

    fn handler(store: &InMemoryLearningStore, predictor: Arc<MockStylePredictor>) -> TriggerClassificationHandler {
        let classifier = Arc::new(HybridClassifier::new(predictor, HybridClassifierConfig::default()));
        TriggerClassificationHandler::new(Arc::new(ClassificationRunner::new(Arc::new(store.clone()), classifier)))
    }

    async fn lock_with_questionnaire(store: &InMemoryLearningStore) {
        let responses = QuestionnaireResponses::new(vec![QuestionnaireAnswer {
            dimension: FslsmDimension::ActiveReflective,
            value: 1,
        }])
        .unwrap();
        store
            .update_with(&user(), ProfileMutation::ApplyQuestionnaire(responses), Timestamp::now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn classifies_new_user_with_rules() {
        let store = InMemoryLearningStore::new();
        let predictor = Arc::new(MockStylePredictor::returning(StyleEstimate::default()));

        let run = handler(&store, predictor.clone())
            .handle(TriggerClassificationCommand::default(), CommandMetadata::new(user()))
            .await
            .unwrap();

        assert_eq!(run.outcome.path, ClassifierPath::RuleBased);
        assert_eq!(run.profile.classification().prediction_count, 1);
        assert_eq!(run.profile.dominant_style(), "Balanced");
        assert_eq!(predictor.health_calls(), 0);
        assert_eq!(store.profile_count().await, 1);
    }

    #[tokio::test]
    async fn questionnaire_lock_is_a_conflict_and_skips_the_classifier() {
        let store = InMemoryLearningStore::new();
        lock_with_questionnaire(&store).await;
        let predictor = Arc::new(MockStylePredictor::returning(StyleEstimate::default()));

        let err = handler(&store, predictor.clone())
            .handle(TriggerClassificationCommand::default(), CommandMetadata::new(user()))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::QuestionnaireLocked);
        assert_eq!(predictor.health_calls(), 0);
        let profile = store.find_by_user(&user()).await.unwrap().unwrap();
        assert_eq!(profile.classification().method, ClassificationMethod::Questionnaire);
    }

    #[tokio::test]
    async fn override_replaces_questionnaire_result() {
        let store = InMemoryLearningStore::new();
        lock_with_questionnaire(&store).await;
        let predictor = Arc::new(MockStylePredictor::unhealthy());

        let run = handler(&store, predictor)
            .handle(
                TriggerClassificationCommand {
                    override_questionnaire: true,
                },
                CommandMetadata::new(user()),
            )
            .await
            .unwrap();

        assert_eq!(run.profile.classification().method, ClassificationMethod::RuleBased);
        assert_eq!(run.profile.classification().prediction_count, 2);
    }
}
