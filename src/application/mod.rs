//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers (tracking, classification, questionnaire, feedback,
//! retention) are kept apart from query handlers (status, profile, summary).

pub mod handlers;

pub use handlers::learning;
