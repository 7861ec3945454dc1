//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the learning style domain.

mod auth;
mod command;
mod errors;
mod ids;
mod percentage;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use command::CommandMetadata;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{BehaviorSessionId, LearningProfileId, UserId};
pub use percentage::Percentage;
pub use timestamp::Timestamp;
