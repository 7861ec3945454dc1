//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Unique identifier for a learning style profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LearningProfileId(Uuid);

impl LearningProfileId {
    /// Creates a new random LearningProfileId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a LearningProfileId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LearningProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LearningProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LearningProfileId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// User identifier (the `userId` claim of the auth token).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new UserId, returning error if empty.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(Self(id))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client-generated identifier of one learning session.
///
/// Opaque to the server; only non-emptiness and a length cap are enforced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BehaviorSessionId(String);

impl BehaviorSessionId {
    /// Longest accepted session identifier.
    pub const MAX_LEN: usize = 128;

    /// Creates a new BehaviorSessionId, returning error if empty or too long.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("session_id"));
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(ValidationError::invalid_format(
                "session_id",
                format!("must be at most {} characters", Self::MAX_LEN),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BehaviorSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn learning_profile_id_generates_unique_values() {
        assert_ne!(LearningProfileId::new(), LearningProfileId::new());
    }

    #[test]
    fn learning_profile_id_parses_from_string() {
        let id = LearningProfileId::new();
        let parsed: LearningProfileId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn user_id_accepts_non_empty_string() {
        let id = UserId::new("user-123").unwrap();
        assert_eq!(id.as_str(), "user-123");
    }

    #[test]
    fn user_id_rejects_blank_string() {
        match UserId::new("   ") {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "user_id"),
            other => panic!("expected EmptyField, got {:?}", other),
        }
    }

    #[test]
    fn behavior_session_id_trims_whitespace() {
        let id = BehaviorSessionId::new("  session-1 ").unwrap();
        assert_eq!(id.as_str(), "session-1");
    }

    #[test]
    fn behavior_session_id_rejects_overlong_values() {
        let long = "s".repeat(BehaviorSessionId::MAX_LEN + 1);
        assert!(matches!(
            BehaviorSessionId::new(long),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn user_id_serializes_as_plain_string() {
        let id = UserId::new("abc").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
