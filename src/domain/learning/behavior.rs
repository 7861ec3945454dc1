//! Session behavior record - raw per-session state as sent by the client.
//!
//! The client sends the full running state of a session on every tracking
//! call. Counters are merged monotonically, content interactions are
//! appended, and the eight ratio features are recomputed after each merge.

use serde::{Deserialize, Deserializer, Serialize};

use super::counters::{non_negative, ActivityEngagement, AiAssistantUsage, ModeUsage, SessionCounters};
use crate::domain::foundation::{BehaviorSessionId, Timestamp, UserId};

/// Most recent content interactions kept per session.
pub const MAX_CONTENT_INTERACTIONS: usize = 500;

fn bounded_percent<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(if raw.is_finite() { raw.clamp(0.0, 100.0) } else { 0.0 })
}

/// Kind of content a learner interacted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Document,
    Video,
    Audio,
    Material,
    #[serde(other)]
    Other,
}

/// One content interaction event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentInteraction {
    #[serde(default)]
    pub content_id: Option<String>,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default, deserialize_with = "non_negative")]
    pub view_duration: u64,
    #[serde(default, deserialize_with = "bounded_percent")]
    pub completion_rate: f64,
    #[serde(default, deserialize_with = "non_negative")]
    pub replay_count: u64,
    #[serde(default, deserialize_with = "bounded_percent")]
    pub scroll_depth: f64,
    #[serde(default, deserialize_with = "non_negative")]
    pub pause_count: u64,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

/// Client device metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceInfo {
    pub user_agent: Option<String>,
    pub screen_size: Option<String>,
    pub platform: Option<String>,
    pub timezone: Option<String>,
}

/// The `behaviorData` payload of one tracking call.
///
/// Absent sections leave the stored session state untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehaviorSnapshot {
    pub mode_usage: Option<ModeUsage>,
    pub ai_assistant_usage: Option<AiAssistantUsage>,
    pub content_interactions: Vec<ContentInteraction>,
    pub activity_engagement: Option<ActivityEngagement>,
    pub device_info: Option<DeviceInfo>,
}

/// Per-session share of learning time spent in each mode, in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RatioFeatures {
    pub active_score: f64,
    pub reflective_score: f64,
    pub sensing_score: f64,
    pub intuitive_score: f64,
    pub visual_score: f64,
    pub verbal_score: f64,
    pub sequential_score: f64,
    pub global_score: f64,
}

impl RatioFeatures {
    /// Computes `modeTime / totalLearningTime`; all zero when no time was spent.
    pub fn from_mode_usage(usage: &ModeUsage) -> Self {
        let total = usage.total_time_ms();
        if total == 0 {
            return Self::default();
        }
        let share = |ms: u64| ms as f64 / total as f64;
        Self {
            active_score: share(usage.active_learning.total_time_ms),
            reflective_score: share(usage.reflective_learning.total_time_ms),
            sensing_score: share(usage.sensing_learning.total_time_ms),
            intuitive_score: share(usage.intuitive_learning.total_time_ms),
            visual_score: share(usage.visual_learning.total_time_ms),
            verbal_score: share(usage.ai_narrator.total_time_ms),
            sequential_score: share(usage.sequential_learning.total_time_ms),
            global_score: share(usage.global_learning.total_time_ms),
        }
    }
}

/// What a merge changed, for logging at the recorder boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Counter fields the client tried to lower; they were kept.
    pub regressions: u32,
    pub interactions_appended: usize,
    /// Oldest interactions dropped to stay within the bound.
    pub interactions_dropped: usize,
}

/// Raw behavior state for one `(user, session)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBehaviorRecord {
    user_id: UserId,
    session_id: BehaviorSessionId,
    counters: SessionCounters,
    content_interactions: Vec<ContentInteraction>,
    features: RatioFeatures,
    device_info: Option<DeviceInfo>,
    /// Counters already reflected in the owning profile's aggregate.
    folded: SessionCounters,
    first_folded_at: Option<Timestamp>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl SessionBehaviorRecord {
    /// Creates an empty record for a session seen for the first time.
    pub fn open(user_id: UserId, session_id: BehaviorSessionId, now: Timestamp) -> Self {
        Self {
            user_id,
            session_id,
            counters: SessionCounters::default(),
            content_interactions: Vec::new(),
            features: RatioFeatures::default(),
            device_info: None,
            folded: SessionCounters::default(),
            first_folded_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn session_id(&self) -> &BehaviorSessionId {
        &self.session_id
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn content_interactions(&self) -> &[ContentInteraction] {
        &self.content_interactions
    }

    pub fn features(&self) -> &RatioFeatures {
        &self.features
    }

    pub fn device_info(&self) -> Option<&DeviceInfo> {
        self.device_info.as_ref()
    }

    pub fn first_folded_at(&self) -> Option<Timestamp> {
        self.first_folded_at
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Total learning time of this session across all modes.
    pub fn total_learning_time_ms(&self) -> u64 {
        self.counters.mode_usage.total_time_ms()
    }

    /// Merges the client's running session state into this record.
    pub fn merge(&mut self, snapshot: BehaviorSnapshot, now: Timestamp) -> MergeReport {
        let mut report = MergeReport::default();

        if let Some(usage) = &snapshot.mode_usage {
            report.regressions += self.counters.merge_mode_usage(usage);
        }
        if let Some(ai) = &snapshot.ai_assistant_usage {
            report.regressions += self.counters.merge_ai_usage(ai);
        }
        if let Some(activity) = &snapshot.activity_engagement {
            report.regressions += self.counters.merge_activity(activity);
        }
        if let Some(device) = snapshot.device_info {
            self.device_info = Some(device);
        }

        report.interactions_appended = snapshot.content_interactions.len();
        self.content_interactions
            .extend(snapshot.content_interactions.into_iter().map(|mut event| {
                event.timestamp.get_or_insert(now);
                event
            }));
        if self.content_interactions.len() > MAX_CONTENT_INTERACTIONS {
            let excess = self.content_interactions.len() - MAX_CONTENT_INTERACTIONS;
            self.content_interactions.drain(..excess);
            report.interactions_dropped = excess;
        }

        self.features = RatioFeatures::from_mode_usage(&self.counters.mode_usage);
        self.updated_at = now;
        report
    }

    /// Counters not yet folded into the aggregate.
    pub fn pending_delta(&self) -> SessionCounters {
        self.counters.delta_since(&self.folded)
    }

    /// Records that the current counters are reflected in the aggregate.
    pub(crate) fn mark_folded(&mut self, now: Timestamp) {
        self.folded = self.counters;
        self.first_folded_at.get_or_insert(now);
    }

    /// True when the session has been idle since before `cutoff`.
    ///
    /// Keyed on the last update so a session still being tracked keeps its
    /// folded counters.
    pub fn is_expired(&self, cutoff: &Timestamp) -> bool {
        self.updated_at.is_before(cutoff)
    }
}
