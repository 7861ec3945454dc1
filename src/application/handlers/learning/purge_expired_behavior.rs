//! PurgeExpiredBehavior - Command handler for the retention sweep.
//!
//! Deletes session behavior records older than the retention horizon.
//! Aggregated totals live on the profile, so purging never changes them.

use std::sync::Arc;

use tracing::info;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::BehaviorStore;

/// Command for one sweep.
#[derive(Debug, Clone, Copy)]
pub struct PurgeExpiredBehaviorCommand {
    /// Reference time; records created more than `retention_days` before it go.
    pub now: Timestamp,
}

/// Result of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeExpiredBehaviorResult {
    pub cutoff: Timestamp,
    pub purged: u64,
}

pub struct PurgeExpiredBehaviorHandler {
    store: Arc<dyn BehaviorStore>,
    retention_days: u32,
}

impl PurgeExpiredBehaviorHandler {
    pub fn new(store: Arc<dyn BehaviorStore>, retention_days: u32) -> Self {
        Self { store, retention_days }
    }

    pub async fn handle(&self, cmd: PurgeExpiredBehaviorCommand) -> Result<PurgeExpiredBehaviorResult, DomainError> {
        let cutoff = cmd.now.minus_days(i64::from(self.retention_days));
        let purged = self.store.purge_expired(cutoff).await?;

        if purged > 0 {
            info!(purged, retention_days = self.retention_days, "Purged expired behavior records");
        }
        Ok(PurgeExpiredBehaviorResult { cutoff, purged })
    }
}
