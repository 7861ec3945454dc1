//! GetLearningProfile - Query handler for the profile view.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::learning::LearningStyleProfile;
use crate::ports::LearningProfileRepository;

/// Query for a user's learning style profile.
#[derive(Debug, Clone)]
pub struct GetLearningProfileQuery {
    pub user_id: UserId,
}

/// The profile when it has been classified at least once.
///
/// A profile that only holds aggregated behavior is reported as not yet
/// classified, the same as no profile at all.
#[derive(Debug, Clone, PartialEq)]
pub enum LearningProfileView {
    NotClassified { total_interactions: u64 },
    Classified(Box<LearningStyleProfile>),
}

pub struct GetLearningProfileHandler {
    profiles: Arc<dyn LearningProfileRepository>,
}

impl GetLearningProfileHandler {
    pub fn new(profiles: Arc<dyn LearningProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn handle(&self, query: GetLearningProfileQuery) -> Result<LearningProfileView, DomainError> {
        let view = match self.profiles.find_by_user(&query.user_id).await? {
            Some(profile) if profile.is_classified() => LearningProfileView::Classified(Box::new(profile)),
            Some(profile) => LearningProfileView::NotClassified {
                total_interactions: profile.total_interactions(),
            },
            None => LearningProfileView::NotClassified { total_interactions: 0 },
        };
        Ok(view)
    }
}
