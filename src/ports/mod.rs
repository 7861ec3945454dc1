//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `BehaviorStore` - Session records and the atomic record-and-fold step
//! - `LearningProfileRepository` - Per-user profiles and typed mutations
//!
//! ## External Service Ports
//!
//! - `StylePredictor` - Remote ML prediction service
//! - `SessionValidator` - Access token validation

mod behavior_store;
mod learning_profile_repository;
mod session_validator;
mod style_predictor;

pub use behavior_store::{BehaviorStore, TrackingOutcome};
pub use learning_profile_repository::LearningProfileRepository;
pub use session_validator::SessionValidator;
pub use style_predictor::{PredictionError, PredictorHealth, StylePrediction, StylePredictor};
