//! In-memory learning store.
//!
//! Holds profiles and session records behind one async mutex, which makes
//! every record-and-fold and profile mutation atomic. Used when no
//! database is configured and in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::{BehaviorSessionId, DomainError, Timestamp, UserId};
use crate::domain::learning::{
    track_session, BehaviorSnapshot, DataQualityPolicy, LearningStyleProfile, ProfileMutation,
    SessionBehaviorRecord,
};
use crate::ports::{BehaviorStore, LearningProfileRepository, TrackingOutcome};

#[derive(Debug, Default)]
struct LearningState {
    profiles: HashMap<UserId, LearningStyleProfile>,
    sessions: HashMap<(UserId, BehaviorSessionId), SessionBehaviorRecord>,
}

impl LearningState {
    fn profile_entry(&mut self, user_id: &UserId, now: Timestamp) -> &mut LearningStyleProfile {
        self.profiles
            .entry(user_id.clone())
            .or_insert_with(|| LearningStyleProfile::new(user_id.clone(), now))
    }
}

/// In-memory implementation of both learning persistence ports.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLearningStore {
    state: Arc<Mutex<LearningState>>,
}

impl InMemoryLearningStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles (useful for tests)
    pub async fn profile_count(&self) -> usize {
        self.state.lock().await.profiles.len()
    }

    /// Number of stored session records (useful for tests)
    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    /// Stores a session record as-is (useful for tests)
    pub async fn insert_session(&self, record: SessionBehaviorRecord) {
        let key = (record.user_id().clone(), record.session_id().clone());
        self.state.lock().await.sessions.insert(key, record);
    }
}

#[async_trait]
impl BehaviorStore for InMemoryLearningStore {
    async fn record_and_fold(
        &self,
        user_id: &UserId,
        session_id: &BehaviorSessionId,
        snapshot: BehaviorSnapshot,
        policy: &DataQualityPolicy,
        now: Timestamp,
    ) -> Result<TrackingOutcome, DomainError> {
        let mut state = self.state.lock().await;
        let key = (user_id.clone(), session_id.clone());
        let existing = state.sessions.remove(&key);

        let profile = state.profile_entry(user_id, now);
        let tracked = track_session(existing, profile, session_id.clone(), snapshot, policy, now);
        let outcome = TrackingOutcome {
            fold: tracked.fold,
            merge: tracked.merge,
            data_quality: *profile.data_quality(),
            classification_method: profile.classification().method,
        };

        state.sessions.insert(key, tracked.record);
        Ok(outcome)
    }

    async fn find_session(
        &self,
        user_id: &UserId,
        session_id: &BehaviorSessionId,
    ) -> Result<Option<SessionBehaviorRecord>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .get(&(user_id.clone(), session_id.clone()))
            .cloned())
    }

    async fn purge_expired(&self, cutoff: Timestamp) -> Result<u64, DomainError> {
        let mut state = self.state.lock().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, record| !record.is_expired(&cutoff));
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait]
impl LearningProfileRepository for InMemoryLearningStore {
    async fn get_or_create(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<LearningStyleProfile, DomainError> {
        let mut state = self.state.lock().await;
        Ok(state.profile_entry(user_id, now).clone())
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<LearningStyleProfile>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.profiles.get(user_id).cloned())
    }

    async fn update_with(
        &self,
        user_id: &UserId,
        mutation: ProfileMutation,
        now: Timestamp,
    ) -> Result<LearningStyleProfile, DomainError> {
        let mut state = self.state.lock().await;
        let stored = state.profile_entry(user_id, now);
        // apply to a copy so a failed mutation leaves the stored profile intact
        let mut updated = stored.clone();
        mutation.apply(&mut updated, now)?;
        *stored = updated.clone();
        Ok(updated)
    }
}
