//! GetClassificationStatus - Query handler for classification readiness.
//!
//! Read-only: a user with no profile yet reports zero interactions instead
//! of having a profile created by the read.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::learning::{
    next_milestone, progress_message, should_classify_now, ConfidenceTier, TierPercentages,
    FIRST_MILESTONE,
};
use crate::ports::LearningProfileRepository;

/// Query for a user's classification readiness.
#[derive(Debug, Clone)]
pub struct GetClassificationStatusQuery {
    pub user_id: UserId,
}

/// Where the user stands relative to the classification milestones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationStatus {
    pub ready_for_classification: bool,
    pub at_milestone: bool,
    pub total_interactions: u64,
    pub confidence_level: ConfidenceTier,
    pub confidence_percentage: u8,
    pub next_milestone: u64,
    pub message: String,
}

impl ClassificationStatus {
    pub fn for_total(total: u64, percentages: &TierPercentages) -> Self {
        let tier = ConfidenceTier::from_total(total);
        Self {
            ready_for_classification: total >= FIRST_MILESTONE,
            at_milestone: should_classify_now(total),
            total_interactions: total,
            confidence_level: tier,
            confidence_percentage: percentages.for_tier(tier),
            next_milestone: next_milestone(total),
            message: progress_message(total),
        }
    }
}

pub struct GetClassificationStatusHandler {
    profiles: Arc<dyn LearningProfileRepository>,
    percentages: TierPercentages,
}

impl GetClassificationStatusHandler {
    pub fn new(profiles: Arc<dyn LearningProfileRepository>, percentages: TierPercentages) -> Self {
        Self { profiles, percentages }
    }

    pub async fn handle(
        &self,
        query: GetClassificationStatusQuery,
    ) -> Result<ClassificationStatus, DomainError> {
        let total = self
            .profiles
            .find_by_user(&query.user_id)
            .await?
            .map(|p| p.total_interactions())
            .unwrap_or(0);

        Ok(ClassificationStatus::for_total(total, &self.percentages))
    }
}
