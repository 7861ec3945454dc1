//! RecordFeedback - Command handler for learner feedback on recommendations.

use std::sync::Arc;

use tracing::debug;

use crate::domain::foundation::{CommandMetadata, DomainError, Timestamp};
use crate::domain::learning::{FeedbackRating, ProfileMutation, RecommendedMode, UserFeedback};
use crate::ports::LearningProfileRepository;

/// Command to record feedback on a recommended mode.
#[derive(Debug, Clone)]
pub struct RecordFeedbackCommand {
    pub recommended_mode: RecommendedMode,
    pub accepted: bool,
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

/// Result of recording feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFeedbackResult {
    /// Feedback entries now kept on the profile.
    pub feedback_count: usize,
}

pub struct RecordFeedbackHandler {
    profiles: Arc<dyn LearningProfileRepository>,
}

impl RecordFeedbackHandler {
    pub fn new(profiles: Arc<dyn LearningProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn handle(
        &self,
        cmd: RecordFeedbackCommand,
        metadata: CommandMetadata,
    ) -> Result<RecordFeedbackResult, DomainError> {
        let now = Timestamp::now();
        let rating = cmd.rating.map(FeedbackRating::new).transpose()?;
        let feedback = UserFeedback::new(cmd.recommended_mode, cmd.accepted, rating, cmd.comment, now)?;

        let profile = self
            .profiles
            .update_with(&metadata.user_id, ProfileMutation::RecordFeedback(feedback), now)
            .await?;

        debug!(
            user_id = %metadata.user_id,
            mode = %cmd.recommended_mode,
            accepted = cmd.accepted,
            "Recommendation feedback recorded"
        );
        Ok(RecordFeedbackResult {
            feedback_count: profile.user_feedback().len(),
        })
    }
}
