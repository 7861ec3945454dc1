//! TrackBehavior - Command handler for the tracking pipeline.
//!
//! Record + fold (atomic in the store), then the classification gate. When
//! an update reaches a milestone, classification runs inline or on a
//! spawned task depending on policy. Tracking succeeds regardless of how
//! classification goes.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::foundation::{
    BehaviorSessionId, CommandMetadata, DomainError, Percentage, Timestamp, UserId,
};
use crate::domain::learning::{
    next_milestone, BehaviorSnapshot, ClassificationMethod, ConfidenceTier, DataQualityPolicy,
    GateDecision,
};
use crate::ports::BehaviorStore;

use super::classification_runner::ClassificationRunner;

/// How tracking reacts to what it aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingPolicy {
    pub data_quality: DataQualityPolicy,
    /// Run milestone classification on a spawned task instead of inline.
    pub background_classification: bool,
}

impl Default for TrackingPolicy {
    fn default() -> Self {
        Self {
            data_quality: DataQualityPolicy::default(),
            background_classification: true,
        }
    }
}

/// Command to record one behavior snapshot.
#[derive(Debug, Clone)]
pub struct TrackBehaviorCommand {
    pub session_id: BehaviorSessionId,
    pub behavior: BehaviorSnapshot,
}

/// Result of a tracking call.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackBehaviorResult {
    pub total_interactions: u64,
    pub has_sufficient_data: bool,
    pub data_completeness: Percentage,
    /// A milestone classification was started (background) or completed (inline).
    pub classification_triggered: bool,
    pub next_milestone: u64,
    pub confidence_level: ConfidenceTier,
}

/// Handler for behavior tracking.
pub struct TrackBehaviorHandler {
    store: Arc<dyn BehaviorStore>,
    runner: Arc<ClassificationRunner>,
    policy: TrackingPolicy,
}

impl TrackBehaviorHandler {
    pub fn new(store: Arc<dyn BehaviorStore>, runner: Arc<ClassificationRunner>, policy: TrackingPolicy) -> Self {
        Self { store, runner, policy }
    }

    pub async fn handle(
        &self,
        cmd: TrackBehaviorCommand,
        metadata: CommandMetadata,
    ) -> Result<TrackBehaviorResult, DomainError> {
        let user_id = metadata.user_id.clone();
        let outcome = self
            .store
            .record_and_fold(
                &user_id,
                &cmd.session_id,
                cmd.behavior,
                &self.policy.data_quality,
                Timestamp::now(),
            )
            .await?;

        if outcome.merge.regressions > 0 {
            warn!(
                user_id = %user_id,
                session_id = %cmd.session_id,
                regressions = outcome.merge.regressions,
                "Client sent counters lower than stored values; kept stored values"
            );
        }
        if outcome.merge.interactions_dropped > 0 {
            debug!(
                session_id = %cmd.session_id,
                dropped = outcome.merge.interactions_dropped,
                "Dropped oldest content interactions"
            );
        }

        let total = outcome.total_interactions();
        let decision = GateDecision::evaluate(outcome.fold.previous_total, total);
        debug!(
            user_id = %user_id,
            previous_total = outcome.fold.previous_total,
            total,
            decision = ?decision,
            "Classification gate evaluated"
        );

        let classification_triggered = match decision {
            GateDecision::Classify { milestone } => {
                if outcome.classification_method == ClassificationMethod::Questionnaire {
                    info!(
                        user_id = %user_id,
                        milestone,
                        "Milestone reached but profile is questionnaire-locked; skipping classification"
                    );
                    false
                } else {
                    self.classify(user_id, milestone, &metadata).await
                }
            }
            GateDecision::Accumulate { .. } => false,
        };

        Ok(TrackBehaviorResult {
            total_interactions: total,
            has_sufficient_data: outcome.data_quality.sufficient_for_ml,
            data_completeness: outcome.data_quality.data_completeness,
            classification_triggered,
            next_milestone: next_milestone(total),
            confidence_level: ConfidenceTier::from_total(total),
        })
    }

    async fn classify(&self, user_id: UserId, milestone: u64, metadata: &CommandMetadata) -> bool {
        let correlation_id = metadata.correlation_id().to_string();
        info!(
            user_id = %user_id,
            milestone,
            correlation_id = %correlation_id,
            background = self.policy.background_classification,
            "Milestone reached, classifying"
        );

        if self.policy.background_classification {
            let runner = Arc::clone(&self.runner);
            tokio::spawn(async move {
                if let Err(err) = runner.run(&user_id, false).await {
                    warn!(
                        user_id = %user_id,
                        correlation_id = %correlation_id,
                        error = %err,
                        "Background classification failed"
                    );
                }
            });
            true
        } else {
            match self.runner.run(&user_id, false).await {
                Ok(_) => true,
                Err(err) => {
                    warn!(
                        user_id = %user_id,
                        correlation_id = %correlation_id,
                        error = %err,
                        "Inline classification failed; tracking result unaffected"
                    );
                    false
                }
            }
        }
    }
}
