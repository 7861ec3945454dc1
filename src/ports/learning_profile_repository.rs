//! LearningProfileRepository port for profile persistence.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::learning::{LearningStyleProfile, ProfileMutation};

/// Repository for learning style profiles, one per user.
#[async_trait]
pub trait LearningProfileRepository: Send + Sync {
    /// Returns the user's profile, creating an empty one atomically if absent.
    async fn get_or_create(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<LearningStyleProfile, DomainError>;

    /// Find profile by user ID
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<LearningStyleProfile>, DomainError>;

    /// Applies `mutation` under the profile's lock and returns the result.
    ///
    /// The profile is created first if absent. A mutation that fails leaves
    /// the stored profile unchanged.
    async fn update_with(
        &self,
        user_id: &UserId,
        mutation: ProfileMutation,
        now: Timestamp,
    ) -> Result<LearningStyleProfile, DomainError>;
}
