//! GetBehaviorSummary - Query handler for aggregated behavior totals.
//!
//! Reads the profile's running aggregate only; session history is never
//! scanned.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::learning::{
    ActivityEngagement, AiAssistantUsage, DataQuality, LearningMode, ModeUsage,
};
use crate::ports::LearningProfileRepository;

/// Query for a user's behavior summary.
#[derive(Debug, Clone)]
pub struct GetBehaviorSummaryQuery {
    pub user_id: UserId,
}

/// Aggregated behavior totals for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorSummary {
    pub total_interactions: u64,
    pub sessions_processed: u64,
    pub total_learning_time_ms: u64,
    pub mode_usage: ModeUsage,
    /// Mode with the highest count; `None` before any mode was used.
    pub most_used_mode: Option<LearningMode>,
    pub ai_assistant_usage: AiAssistantUsage,
    pub average_prompt_length: f64,
    pub activity_engagement: ActivityEngagement,
    pub data_quality: DataQuality,
    pub last_processed_at: Option<Timestamp>,
}

impl BehaviorSummary {
    fn empty() -> Self {
        Self {
            total_interactions: 0,
            sessions_processed: 0,
            total_learning_time_ms: 0,
            mode_usage: ModeUsage::default(),
            most_used_mode: None,
            ai_assistant_usage: AiAssistantUsage::default(),
            average_prompt_length: 0.0,
            activity_engagement: ActivityEngagement::default(),
            data_quality: DataQuality::default(),
            last_processed_at: None,
        }
    }
}

fn most_used_mode(usage: &ModeUsage) -> Option<LearningMode> {
    LearningMode::ALL
        .into_iter()
        .filter(|mode| usage.get(*mode).count > 0)
        // first mode wins ties
        .fold(None, |best: Option<LearningMode>, mode| match best {
            Some(b) if usage.get(b).count >= usage.get(mode).count => Some(b),
            _ => Some(mode),
        })
}

pub struct GetBehaviorSummaryHandler {
    profiles: Arc<dyn LearningProfileRepository>,
}

impl GetBehaviorSummaryHandler {
    pub fn new(profiles: Arc<dyn LearningProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn handle(&self, query: GetBehaviorSummaryQuery) -> Result<BehaviorSummary, DomainError> {
        let Some(profile) = self.profiles.find_by_user(&query.user_id).await? else {
            return Ok(BehaviorSummary::empty());
        };

        let stats = profile.aggregated_stats();
        Ok(BehaviorSummary {
            total_interactions: stats.total_interactions_processed(),
            sessions_processed: stats.sessions_processed(),
            total_learning_time_ms: stats.total_learning_time_ms(),
            mode_usage: *stats.mode_usage(),
            most_used_mode: most_used_mode(stats.mode_usage()),
            ai_assistant_usage: *stats.ai_assistant_usage(),
            average_prompt_length: stats.ai_assistant_usage().average_prompt_length(),
            activity_engagement: *stats.activity_engagement(),
            data_quality: *profile.data_quality(),
            last_processed_at: stats.last_processed_at(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::learning::InMemoryLearningStore;
    use crate::domain::foundation::BehaviorSessionId;
    use crate::domain::learning::DataQualityPolicy;
    use crate::ports::BehaviorStore;
    use serde_json::json;

    fn user() -> UserId {
        UserId::new("learner-1").unwrap()
    }

    #[tokio::test]
    async fn unknown_user_gets_empty_summary() {
        let handler = GetBehaviorSummaryHandler::new(Arc::new(InMemoryLearningStore::new()));

        let summary = handler.handle(GetBehaviorSummaryQuery { user_id: user() }).await.unwrap();

        assert_eq!(summary.total_interactions, 0);
        assert_eq!(summary.most_used_mode, None);
        assert_eq!(summary.average_prompt_length, 0.0);
        assert!(!summary.data_quality.sufficient_for_ml);
    }

    #[tokio::test]
    async fn summary_reflects_folded_sessions() {
        let store = InMemoryLearningStore::new();
        for (session, visual) in [("s1", 4), ("s2", 6)] {
            store
                .record_and_fold(
                    &user(),
                    &BehaviorSessionId::new(session).unwrap(),
                    serde_json::from_value(json!({
                        "modeUsage": {
                            "visualLearning": { "count": visual, "totalTime": 1000 },
                            "activeLearning": { "count": 1, "totalTime": 500 }
                        },
                        "aiAssistantUsage": {
                            "askMode": { "count": 2, "totalTime": 0 },
                            "totalPromptLength": 100
                        }
                    }))
                    .unwrap(),
                    &DataQualityPolicy::default(),
                    Timestamp::now(),
                )
                .await
                .unwrap();
        }
        let handler = GetBehaviorSummaryHandler::new(Arc::new(store));

        let summary = handler.handle(GetBehaviorSummaryQuery { user_id: user() }).await.unwrap();

        assert_eq!(summary.sessions_processed, 2);
        assert_eq!(summary.mode_usage.visual_learning.count, 10);
        assert_eq!(summary.most_used_mode, Some(LearningMode::VisualLearning));
        assert_eq!(summary.ai_assistant_usage.total_interactions, 4);
        assert_eq!(summary.average_prompt_length, 50.0);
        assert_eq!(summary.total_interactions, summary.data_quality.total_interactions);
        assert!(summary.last_processed_at.is_some());
    }

    #[test]
    fn most_used_mode_prefers_first_on_ties() {
        let mut usage = ModeUsage::default();
        usage.sequential_learning.count = 3;
        usage.active_learning.count = 3;

        assert_eq!(most_used_mode(&usage), Some(LearningMode::SequentialLearning));
    }
}
