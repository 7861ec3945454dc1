//! Incremental aggregation of session counters into a profile.
//!
//! Each session record remembers what it has already contributed
//! (`folded`), so folding is a delta: `current - folded`. Folding the same
//! state twice adds nothing, and no other session is ever read.

use serde::{Deserialize, Serialize};

use super::behavior::SessionBehaviorRecord;
use super::counters::{ActivityEngagement, AiAssistantUsage, ModeUsage, SessionCounters};
use crate::domain::foundation::{BehaviorSessionId, Percentage, Timestamp};

/// Thresholds used to grade the aggregate's data quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityPolicy {
    /// Interactions needed before the data counts as sufficient for ML.
    pub sufficient_for_ml_threshold: u64,
    /// Interactions that correspond to 100% completeness.
    pub completeness_target: u64,
}

impl Default for DataQualityPolicy {
    fn default() -> Self {
        Self {
            sufficient_for_ml_threshold: 10,
            completeness_target: 20,
        }
    }
}

/// Data-quality indicators derived from the aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub total_interactions: u64,
    pub data_completeness: Percentage,
    #[serde(rename = "sufficientForML")]
    pub sufficient_for_ml: bool,
    pub last_data_update: Option<Timestamp>,
}

impl DataQuality {
    pub fn assess(total_interactions: u64, policy: &DataQualityPolicy, now: Timestamp) -> Self {
        Self {
            total_interactions,
            data_completeness: Percentage::of_ratio(total_interactions, policy.completeness_target),
            sufficient_for_ml: total_interactions >= policy.sufficient_for_ml_threshold,
            last_data_update: Some(now),
        }
    }
}

/// Result of folding one session into the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldOutcome {
    pub previous_total: u64,
    pub current_total: u64,
    pub interactions_added: u64,
    /// True when the session's current state was already reflected.
    pub already_folded: bool,
}

/// Running totals across every session folded so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregatedStats {
    #[serde(flatten)]
    counters: SessionCounters,
    total_interactions_processed: u64,
    sessions_processed: u64,
    last_processed_session: Option<BehaviorSessionId>,
    last_processed_at: Option<Timestamp>,
}

impl AggregatedStats {
    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn mode_usage(&self) -> &ModeUsage {
        &self.counters.mode_usage
    }

    pub fn ai_assistant_usage(&self) -> &AiAssistantUsage {
        &self.counters.ai_assistant_usage
    }

    pub fn activity_engagement(&self) -> &ActivityEngagement {
        &self.counters.activity_engagement
    }

    pub fn total_interactions_processed(&self) -> u64 {
        self.total_interactions_processed
    }

    pub fn sessions_processed(&self) -> u64 {
        self.sessions_processed
    }

    pub fn last_processed_session(&self) -> Option<&BehaviorSessionId> {
        self.last_processed_session.as_ref()
    }

    pub fn last_processed_at(&self) -> Option<Timestamp> {
        self.last_processed_at
    }

    pub fn total_learning_time_ms(&self) -> u64 {
        self.counters.mode_usage.total_time_ms()
    }

    /// True when the processed total equals the sum of aggregated counters.
    pub fn is_consistent(&self) -> bool {
        self.counters.interaction_count() == self.total_interactions_processed
    }

    /// Folds the record's unfolded counters into the running totals and
    /// marks them as folded on the record.
    pub fn fold(&mut self, record: &mut SessionBehaviorRecord, now: Timestamp) -> FoldOutcome {
        let previous_total = self.total_interactions_processed;
        let delta = record.pending_delta();
        let first_fold = record.first_folded_at().is_none();

        if delta.is_zero() && !first_fold {
            return FoldOutcome {
                previous_total,
                current_total: previous_total,
                interactions_added: 0,
                already_folded: true,
            };
        }

        let added = delta.interaction_count();
        self.counters.accumulate(&delta);
        self.total_interactions_processed = self.total_interactions_processed.saturating_add(added);
        if first_fold {
            self.sessions_processed += 1;
        }
        self.last_processed_session = Some(record.session_id().clone());
        self.last_processed_at = Some(now);
        record.mark_folded(now);

        FoldOutcome {
            previous_total,
            current_total: self.total_interactions_processed,
            interactions_added: added,
            already_folded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;
    use crate::domain::learning::behavior::BehaviorSnapshot;
    use proptest::prelude::*;
    use serde_json::json;

    fn session(id: &str) -> SessionBehaviorRecord {
        SessionBehaviorRecord::open(
            UserId::new("learner-1").unwrap(),
            BehaviorSessionId::new(id).unwrap(),
            Timestamp::now(),
        )
    }

    fn with_active(count: u64) -> BehaviorSnapshot {
        serde_json::from_value(json!({
            "modeUsage": { "activeLearning": { "count": count, "totalTime": count * 1000 } },
            "activityEngagement": { "discussionParticipation": count }
        }))
        .unwrap()
    }

    #[test]
    fn folding_same_state_twice_counts_once() {
        let mut stats = AggregatedStats::default();
        let mut record = session("s1");
        record.merge(with_active(4), Timestamp::now());

        let first = stats.fold(&mut record, Timestamp::now());
        let second = stats.fold(&mut record, Timestamp::now());

        assert_eq!(first.interactions_added, 4);
        assert!(!first.already_folded);
        assert!(second.already_folded);
        assert_eq!(stats.total_interactions_processed(), 4);
        assert_eq!(stats.activity_engagement().discussion_participation, 4);
        assert_eq!(stats.sessions_processed(), 1);
    }

    #[test]
    fn updated_session_folds_only_the_increase() {
        let mut stats = AggregatedStats::default();
        let mut record = session("s1");
        record.merge(with_active(2), Timestamp::now());
        stats.fold(&mut record, Timestamp::now());

        record.merge(with_active(5), Timestamp::now());
        let outcome = stats.fold(&mut record, Timestamp::now());

        assert_eq!(outcome.previous_total, 2);
        assert_eq!(outcome.current_total, 5);
        assert_eq!(stats.mode_usage().active_learning.total_time_ms, 5000);
        assert_eq!(stats.sessions_processed(), 1);
    }

    #[test]
    fn sessions_are_counted_once_each() {
        let mut stats = AggregatedStats::default();
        let mut a = session("a");
        let mut b = session("b");
        a.merge(with_active(1), Timestamp::now());
        b.merge(with_active(2), Timestamp::now());

        stats.fold(&mut a, Timestamp::now());
        stats.fold(&mut b, Timestamp::now());

        assert_eq!(stats.sessions_processed(), 2);
        assert_eq!(stats.total_interactions_processed(), 3);
        assert_eq!(stats.last_processed_session().map(|s| s.as_str()), Some("b"));
    }

    #[test]
    fn empty_first_session_still_counts_as_processed() {
        let mut stats = AggregatedStats::default();
        let mut record = session("empty");

        let outcome = stats.fold(&mut record, Timestamp::now());

        assert!(!outcome.already_folded);
        assert_eq!(outcome.interactions_added, 0);
        assert_eq!(stats.sessions_processed(), 1);
    }

    #[test]
    fn ai_interactions_count_toward_total() {
        let mut stats = AggregatedStats::default();
        let mut record = session("ai");
        record.merge(
            serde_json::from_value(json!({
                "aiAssistantUsage": { "askMode": { "count": 3 }, "totalInteractions": 1 }
            }))
            .unwrap(),
            Timestamp::now(),
        );

        stats.fold(&mut record, Timestamp::now());

        assert_eq!(stats.total_interactions_processed(), 3);
        assert!(stats.is_consistent());
    }

    #[test]
    fn data_quality_caps_completeness() {
        let policy = DataQualityPolicy::default();

        let early = DataQuality::assess(7, &policy, Timestamp::now());
        let late = DataQuality::assess(45, &policy, Timestamp::now());

        assert_eq!(early.data_completeness.value(), 35);
        assert!(!early.sufficient_for_ml);
        assert_eq!(late.data_completeness, Percentage::HUNDRED);
        assert!(late.sufficient_for_ml);
    }

    #[test]
    fn data_quality_serializes_ml_flag_name() {
        let quality = DataQuality::assess(10, &DataQualityPolicy::default(), Timestamp::now());
        let value = serde_json::to_value(quality).unwrap();
        assert_eq!(value["sufficientForML"], json!(true));
        assert_eq!(value["dataCompleteness"], json!(50));
    }

    proptest! {
        #[test]
        fn total_is_monotonic_and_consistent(steps in proptest::collection::vec((0usize..3, 0u64..40), 1..40)) {
            let mut stats = AggregatedStats::default();
            let mut sessions = vec![session("p0"), session("p1"), session("p2")];
            let mut last_total = 0;

            for (index, count) in steps {
                let record = &mut sessions[index];
                record.merge(with_active(count), Timestamp::now());
                let outcome = stats.fold(record, Timestamp::now());

                prop_assert!(outcome.current_total >= last_total);
                prop_assert!(stats.is_consistent());
                last_total = outcome.current_total;

                let again = stats.fold(record, Timestamp::now());
                prop_assert_eq!(again.current_total, last_total);
            }
        }
    }
}
