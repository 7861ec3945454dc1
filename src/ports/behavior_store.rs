//! BehaviorStore port - session records plus the atomic record-and-fold step.

use async_trait::async_trait;

use crate::domain::foundation::{BehaviorSessionId, DomainError, Timestamp, UserId};
use crate::domain::learning::{
    BehaviorSnapshot, ClassificationMethod, DataQuality, DataQualityPolicy, FoldOutcome,
    MergeReport, SessionBehaviorRecord,
};

/// What one tracking call changed.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingOutcome {
    pub fold: FoldOutcome,
    pub merge: MergeReport,
    /// Profile data quality after the fold.
    pub data_quality: DataQuality,
    /// Classification method currently on the profile.
    pub classification_method: ClassificationMethod,
}

impl TrackingOutcome {
    pub fn total_interactions(&self) -> u64 {
        self.fold.current_total
    }
}

/// Persistence for session behavior records.
///
/// # Contract
///
/// `record_and_fold` must merge the snapshot into the session record and
/// fold it into the owning profile (created if absent) as one atomic unit
/// per user: concurrent calls for the same user never lose an increment
/// and never create a second profile.
#[async_trait]
pub trait BehaviorStore: Send + Sync {
    async fn record_and_fold(
        &self,
        user_id: &UserId,
        session_id: &BehaviorSessionId,
        snapshot: BehaviorSnapshot,
        policy: &DataQualityPolicy,
        now: Timestamp,
    ) -> Result<TrackingOutcome, DomainError>;

    async fn find_session(
        &self,
        user_id: &UserId,
        session_id: &BehaviorSessionId,
    ) -> Result<Option<SessionBehaviorRecord>, DomainError>;

    /// Deletes records created before `cutoff`. Returns how many went.
    async fn purge_expired(&self, cutoff: Timestamp) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_store_is_object_safe() {
        fn _accepts(_store: &dyn BehaviorStore) {}
    }
}
