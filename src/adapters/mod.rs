//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - session validators (JWT, mock)
//! - `http` - axum routes, handlers and middleware
//! - `learning` - behavior and profile persistence (PostgreSQL, in-memory)
//! - `ml` - prediction service client (HTTP, mock)

pub mod auth;
pub mod http;
pub mod learning;
pub mod ml;

pub use auth::{JwtSessionValidator, MockSessionValidator};
pub use learning::{InMemoryLearningStore, PostgresLearningStore};
pub use ml::{HttpStylePredictor, MockStylePredictor, PredictionServiceConfig};
