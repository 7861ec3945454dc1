//! Interaction counters shared by session records and aggregated stats.
//!
//! Every counter deserializes leniently: negative, fractional or non-finite
//! client values are clamped to a non-negative integer at the boundary.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Clamps a client-sent number to a non-negative whole counter.
pub fn clamp_counter(raw: f64) -> u64 {
    if raw.is_finite() && raw > 0.0 {
        raw.floor() as u64
    } else {
        0
    }
}

pub(crate) fn non_negative<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.map(clamp_counter).unwrap_or(0))
}

/// The eight tracked learning modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LearningMode {
    AiNarrator,
    VisualLearning,
    SequentialLearning,
    GlobalLearning,
    SensingLearning,
    IntuitiveLearning,
    ActiveLearning,
    ReflectiveLearning,
}

impl LearningMode {
    /// All modes in storage order.
    pub const ALL: [LearningMode; 8] = [
        LearningMode::AiNarrator,
        LearningMode::VisualLearning,
        LearningMode::SequentialLearning,
        LearningMode::GlobalLearning,
        LearningMode::SensingLearning,
        LearningMode::IntuitiveLearning,
        LearningMode::ActiveLearning,
        LearningMode::ReflectiveLearning,
    ];

    /// Wire key of the mode.
    pub fn key(&self) -> &'static str {
        match self {
            LearningMode::AiNarrator => "aiNarrator",
            LearningMode::VisualLearning => "visualLearning",
            LearningMode::SequentialLearning => "sequentialLearning",
            LearningMode::GlobalLearning => "globalLearning",
            LearningMode::SensingLearning => "sensingLearning",
            LearningMode::IntuitiveLearning => "intuitiveLearning",
            LearningMode::ActiveLearning => "activeLearning",
            LearningMode::ReflectiveLearning => "reflectiveLearning",
        }
    }
}

impl fmt::Display for LearningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Usage count and accumulated time (milliseconds) of one mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeCounter {
    #[serde(default, deserialize_with = "non_negative")]
    pub count: u64,
    #[serde(default, rename = "totalTime", deserialize_with = "non_negative")]
    pub total_time_ms: u64,
}

impl ModeCounter {
    pub fn new(count: u64, total_time_ms: u64) -> Self {
        Self {
            count,
            total_time_ms,
        }
    }

    /// Raises both fields to at least `incoming`; returns how many fields
    /// the incoming value tried to lower.
    fn merge_monotone(&mut self, incoming: &ModeCounter) -> u32 {
        let mut regressions = 0;
        regressions += raise(&mut self.count, incoming.count);
        regressions += raise(&mut self.total_time_ms, incoming.total_time_ms);
        regressions
    }

    fn saturating_sub(&self, other: &ModeCounter) -> ModeCounter {
        ModeCounter {
            count: self.count.saturating_sub(other.count),
            total_time_ms: self.total_time_ms.saturating_sub(other.total_time_ms),
        }
    }

    fn accumulate(&mut self, delta: &ModeCounter) {
        self.count = self.count.saturating_add(delta.count);
        self.total_time_ms = self.total_time_ms.saturating_add(delta.total_time_ms);
    }
}

/// Sets `current` to `incoming` unless that would lower it.
fn raise(current: &mut u64, incoming: u64) -> u32 {
    if incoming < *current {
        1
    } else {
        *current = incoming;
        0
    }
}

/// Per-mode counters for the eight learning modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModeUsage {
    pub ai_narrator: ModeCounter,
    pub visual_learning: ModeCounter,
    pub sequential_learning: ModeCounter,
    pub global_learning: ModeCounter,
    pub sensing_learning: ModeCounter,
    pub intuitive_learning: ModeCounter,
    pub active_learning: ModeCounter,
    pub reflective_learning: ModeCounter,
}

impl ModeUsage {
    pub fn get(&self, mode: LearningMode) -> &ModeCounter {
        match mode {
            LearningMode::AiNarrator => &self.ai_narrator,
            LearningMode::VisualLearning => &self.visual_learning,
            LearningMode::SequentialLearning => &self.sequential_learning,
            LearningMode::GlobalLearning => &self.global_learning,
            LearningMode::SensingLearning => &self.sensing_learning,
            LearningMode::IntuitiveLearning => &self.intuitive_learning,
            LearningMode::ActiveLearning => &self.active_learning,
            LearningMode::ReflectiveLearning => &self.reflective_learning,
        }
    }

    pub fn get_mut(&mut self, mode: LearningMode) -> &mut ModeCounter {
        match mode {
            LearningMode::AiNarrator => &mut self.ai_narrator,
            LearningMode::VisualLearning => &mut self.visual_learning,
            LearningMode::SequentialLearning => &mut self.sequential_learning,
            LearningMode::GlobalLearning => &mut self.global_learning,
            LearningMode::SensingLearning => &mut self.sensing_learning,
            LearningMode::IntuitiveLearning => &mut self.intuitive_learning,
            LearningMode::ActiveLearning => &mut self.active_learning,
            LearningMode::ReflectiveLearning => &mut self.reflective_learning,
        }
    }

    /// Sum of counts across all modes.
    pub fn total_count(&self) -> u64 {
        LearningMode::ALL
            .iter()
            .map(|m| self.get(*m).count)
            .fold(0u64, u64::saturating_add)
    }

    /// Sum of time across all modes, in milliseconds.
    pub fn total_time_ms(&self) -> u64 {
        LearningMode::ALL
            .iter()
            .map(|m| self.get(*m).total_time_ms)
            .fold(0u64, u64::saturating_add)
    }

    fn merge_monotone(&mut self, incoming: &ModeUsage) -> u32 {
        LearningMode::ALL
            .iter()
            .map(|m| self.get_mut(*m).merge_monotone(incoming.get(*m)))
            .sum()
    }

    fn saturating_sub(&self, other: &ModeUsage) -> ModeUsage {
        let mut out = ModeUsage::default();
        for mode in LearningMode::ALL {
            *out.get_mut(mode) = self.get(mode).saturating_sub(other.get(mode));
        }
        out
    }

    fn accumulate(&mut self, delta: &ModeUsage) {
        for mode in LearningMode::ALL {
            self.get_mut(mode).accumulate(delta.get(mode));
        }
    }
}

/// AI assistant usage broken down by sub-mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiAssistantUsage {
    pub ask_mode: ModeCounter,
    pub research_mode: ModeCounter,
    pub text_to_docs_mode: ModeCounter,
    #[serde(deserialize_with = "non_negative")]
    pub total_interactions: u64,
    #[serde(deserialize_with = "non_negative")]
    pub total_prompt_length: u64,
}

impl AiAssistantUsage {
    /// Sum of the three sub-mode counts.
    pub fn sub_mode_count(&self) -> u64 {
        self.ask_mode
            .count
            .saturating_add(self.research_mode.count)
            .saturating_add(self.text_to_docs_mode.count)
    }

    /// Repairs a stale `total_interactions` that is below the sub-mode sum.
    pub fn normalized(mut self) -> Self {
        self.total_interactions = self.total_interactions.max(self.sub_mode_count());
        self
    }

    /// Mean prompt length, 0 when no interactions were recorded.
    pub fn average_prompt_length(&self) -> f64 {
        if self.total_interactions == 0 {
            return 0.0;
        }
        self.total_prompt_length as f64 / self.total_interactions as f64
    }

    fn merge_monotone(&mut self, incoming: &AiAssistantUsage) -> u32 {
        let incoming = incoming.normalized();
        let regressions = self.ask_mode.merge_monotone(&incoming.ask_mode)
            + self.research_mode.merge_monotone(&incoming.research_mode)
            + self.text_to_docs_mode.merge_monotone(&incoming.text_to_docs_mode)
            + raise(&mut self.total_interactions, incoming.total_interactions)
            + raise(&mut self.total_prompt_length, incoming.total_prompt_length);
        *self = self.normalized();
        regressions
    }

    fn saturating_sub(&self, other: &AiAssistantUsage) -> AiAssistantUsage {
        AiAssistantUsage {
            ask_mode: self.ask_mode.saturating_sub(&other.ask_mode),
            research_mode: self.research_mode.saturating_sub(&other.research_mode),
            text_to_docs_mode: self.text_to_docs_mode.saturating_sub(&other.text_to_docs_mode),
            total_interactions: self
                .total_interactions
                .saturating_sub(other.total_interactions),
            total_prompt_length: self
                .total_prompt_length
                .saturating_sub(other.total_prompt_length),
        }
    }

    fn accumulate(&mut self, delta: &AiAssistantUsage) {
        self.ask_mode.accumulate(&delta.ask_mode);
        self.research_mode.accumulate(&delta.research_mode);
        self.text_to_docs_mode.accumulate(&delta.text_to_docs_mode);
        self.total_interactions = self.total_interactions.saturating_add(delta.total_interactions);
        self.total_prompt_length = self
            .total_prompt_length
            .saturating_add(delta.total_prompt_length);
    }
}

/// Activity engagement counter bag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityEngagement {
    #[serde(deserialize_with = "non_negative")]
    pub quizzes_completed: u64,
    #[serde(deserialize_with = "non_negative")]
    pub practice_questions_attempted: u64,
    #[serde(deserialize_with = "non_negative")]
    pub discussion_participation: u64,
    #[serde(deserialize_with = "non_negative")]
    pub reflection_journal_entries: u64,
    #[serde(deserialize_with = "non_negative")]
    pub visual_diagrams_viewed: u64,
    #[serde(deserialize_with = "non_negative")]
    pub hands_on_labs_completed: u64,
    #[serde(deserialize_with = "non_negative")]
    pub concept_explorations_count: u64,
    #[serde(deserialize_with = "non_negative")]
    pub sequential_steps_completed: u64,
}

impl ActivityEngagement {
    fn fields(&self) -> [u64; 8] {
        [
            self.quizzes_completed,
            self.practice_questions_attempted,
            self.discussion_participation,
            self.reflection_journal_entries,
            self.visual_diagrams_viewed,
            self.hands_on_labs_completed,
            self.concept_explorations_count,
            self.sequential_steps_completed,
        ]
    }

    fn fields_mut(&mut self) -> [&mut u64; 8] {
        [
            &mut self.quizzes_completed,
            &mut self.practice_questions_attempted,
            &mut self.discussion_participation,
            &mut self.reflection_journal_entries,
            &mut self.visual_diagrams_viewed,
            &mut self.hands_on_labs_completed,
            &mut self.concept_explorations_count,
            &mut self.sequential_steps_completed,
        ]
    }

    fn merge_monotone(&mut self, incoming: &ActivityEngagement) -> u32 {
        self.fields_mut()
            .into_iter()
            .zip(incoming.fields())
            .map(|(current, value)| raise(current, value))
            .sum()
    }

    fn saturating_sub(&self, other: &ActivityEngagement) -> ActivityEngagement {
        let mut out = *self;
        for (field, value) in out.fields_mut().into_iter().zip(other.fields()) {
            *field = field.saturating_sub(value);
        }
        out
    }

    fn accumulate(&mut self, delta: &ActivityEngagement) {
        for (field, value) in self.fields_mut().into_iter().zip(delta.fields()) {
            *field = field.saturating_add(value);
        }
    }
}

/// The foldable counters of a session: everything the aggregate sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionCounters {
    pub mode_usage: ModeUsage,
    pub ai_assistant_usage: AiAssistantUsage,
    pub activity_engagement: ActivityEngagement,
}

impl SessionCounters {
    /// Interactions contributed: mode counts plus AI assistant interactions.
    pub fn interaction_count(&self) -> u64 {
        self.mode_usage
            .total_count()
            .saturating_add(self.ai_assistant_usage.total_interactions)
    }

    pub fn is_zero(&self) -> bool {
        *self == SessionCounters::default()
    }

    pub(crate) fn merge_mode_usage(&mut self, incoming: &ModeUsage) -> u32 {
        self.mode_usage.merge_monotone(incoming)
    }

    pub(crate) fn merge_ai_usage(&mut self, incoming: &AiAssistantUsage) -> u32 {
        self.ai_assistant_usage.merge_monotone(incoming)
    }

    pub(crate) fn merge_activity(&mut self, incoming: &ActivityEngagement) -> u32 {
        self.activity_engagement.merge_monotone(incoming)
    }

    /// Field-wise `self - other`, floored at zero.
    pub fn delta_since(&self, other: &SessionCounters) -> SessionCounters {
        SessionCounters {
            mode_usage: self.mode_usage.saturating_sub(&other.mode_usage),
            ai_assistant_usage: self
                .ai_assistant_usage
                .saturating_sub(&other.ai_assistant_usage),
            activity_engagement: self
                .activity_engagement
                .saturating_sub(&other.activity_engagement),
        }
    }

    /// Field-wise `self += delta`.
    pub fn accumulate(&mut self, delta: &SessionCounters) {
        self.mode_usage.accumulate(&delta.mode_usage);
        self.ai_assistant_usage.accumulate(&delta.ai_assistant_usage);
        self.activity_engagement.accumulate(&delta.activity_engagement);
    }
}
