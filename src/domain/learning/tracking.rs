//! One tracking step: merge a snapshot into its session record, then fold
//! the record into the owning profile.
//!
//! Stores call this while holding whatever lock or transaction makes the
//! record and profile update atomic.

use super::aggregation::{DataQualityPolicy, FoldOutcome};
use super::behavior::{BehaviorSnapshot, MergeReport, SessionBehaviorRecord};
use super::profile::LearningStyleProfile;
use crate::domain::foundation::{BehaviorSessionId, Timestamp};

/// Result of [`track_session`].
#[derive(Debug, Clone)]
pub struct TrackedSession {
    pub record: SessionBehaviorRecord,
    pub merge: MergeReport,
    pub fold: FoldOutcome,
}

/// Merges `snapshot` into the stored record (or a fresh one) and folds the
/// unfolded part into `profile`.
pub fn track_session(
    existing: Option<SessionBehaviorRecord>,
    profile: &mut LearningStyleProfile,
    session_id: BehaviorSessionId,
    snapshot: BehaviorSnapshot,
    policy: &DataQualityPolicy,
    now: Timestamp,
) -> TrackedSession {
    let mut record = existing
        .unwrap_or_else(|| SessionBehaviorRecord::open(profile.user_id().clone(), session_id, now));
    let merge = record.merge(snapshot, now);
    let fold = profile.fold_session(&mut record, policy, now);
    TrackedSession { record, merge, fold }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use serde_json::json;

    fn snapshot(count: u64) -> BehaviorSnapshot {
        serde_json::from_value(json!({
            "modeUsage": { "visualLearning": { "count": count, "totalTime": count * 500 } }
        }))
        .unwrap()
    }

    #[test]
    fn repeated_state_is_folded_once() {
        let mut profile = LearningStyleProfile::new(UserId::new("learner-1").unwrap(), Timestamp::now());
        let session = BehaviorSessionId::new("s1").unwrap();
        let policy = DataQualityPolicy::default();

        let first = track_session(None, &mut profile, session.clone(), snapshot(3), &policy, Timestamp::now());
        let second = track_session(
            Some(first.record),
            &mut profile,
            session,
            snapshot(3),
            &policy,
            Timestamp::now(),
        );

        assert_eq!(first.fold.interactions_added, 3);
        assert!(second.fold.already_folded);
        assert_eq!(profile.total_interactions(), 3);
        assert_eq!(profile.aggregated_stats().sessions_processed(), 1);
    }

    #[test]
    fn new_record_belongs_to_profile_owner() {
        let mut profile = LearningStyleProfile::new(UserId::new("learner-9").unwrap(), Timestamp::now());

        let tracked = track_session(
            None,
            &mut profile,
            BehaviorSessionId::new("fresh").unwrap(),
            BehaviorSnapshot::default(),
            &DataQualityPolicy::default(),
            Timestamp::now(),
        );

        assert_eq!(tracked.record.user_id().as_str(), "learner-9");
        assert_eq!(tracked.fold.current_total, 0);
    }
}
