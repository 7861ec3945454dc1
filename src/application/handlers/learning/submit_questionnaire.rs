//! SubmitQuestionnaire - Command handler for self-reported learning style.
//!
//! A questionnaire result replaces any automatic classification and locks
//! the profile against milestone reclassification until the learner
//! explicitly asks for an override.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{CommandMetadata, DomainError, Timestamp};
use crate::domain::learning::{
    LearningStyleProfile, ProfileMutation, QuestionnaireAnswer, QuestionnaireResponses,
};
use crate::ports::LearningProfileRepository;

/// Command carrying the raw answers.
#[derive(Debug, Clone)]
pub struct SubmitQuestionnaireCommand {
    pub answers: Vec<QuestionnaireAnswer>,
}

pub struct SubmitQuestionnaireHandler {
    profiles: Arc<dyn LearningProfileRepository>,
}

impl SubmitQuestionnaireHandler {
    pub fn new(profiles: Arc<dyn LearningProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn handle(
        &self,
        cmd: SubmitQuestionnaireCommand,
        metadata: CommandMetadata,
    ) -> Result<LearningStyleProfile, DomainError> {
        let responses = QuestionnaireResponses::new(cmd.answers)?;
        let answered = responses.len();

        let profile = self
            .profiles
            .update_with(
                &metadata.user_id,
                ProfileMutation::ApplyQuestionnaire(responses),
                Timestamp::now(),
            )
            .await?;

        info!(
            user_id = %metadata.user_id,
            answered,
            dominant_style = %profile.dominant_style(),
            "Questionnaire applied"
        );
        Ok(profile)
    }
}
