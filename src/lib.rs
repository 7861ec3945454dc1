//! Learning Style Engine
//!
//! Tracks learner behavior per session, folds it incrementally into a
//! per-user aggregate, and classifies learning style on the four FSLSM
//! axes at interaction milestones. Classification prefers a remote ML
//! prediction service and falls back to deterministic rules.
//!
//! ## Layout
//!
//! - `domain` - behavior, aggregation, gate, classifiers, profile
//! - `ports` - persistence, prediction service and token validation contracts
//! - `adapters` - PostgreSQL, in-memory, HTTP client, JWT and axum adapters
//! - `application` - command and query handlers
//! - `config` - environment-driven configuration

pub mod adapters;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
