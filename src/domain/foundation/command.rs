//! Per-command context passed to application handlers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Who issued a command, plus the id that ties its log lines together.
///
/// A spawned milestone classification carries the correlation id of the
/// tracking request that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    pub user_id: UserId,
    correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl CommandMetadata {
    /// Metadata with a freshly generated correlation id.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            correlation_id: Uuid::new_v4().to_string(),
            source: None,
        }
    }

    /// Reuses an upstream id (e.g. `x-request-id`); blank ids are ignored.
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !id.trim().is_empty() {
            self.correlation_id = id;
        }
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}
