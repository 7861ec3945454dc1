//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `learning` - Behavior aggregation, classification gate, FSLSM scoring and profiles

pub mod foundation;
pub mod learning;
