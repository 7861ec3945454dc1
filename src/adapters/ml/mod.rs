//! Prediction service adapters.
//!
//! - `HttpStylePredictor` - reqwest client for `/health` and `/predict`
//! - `MockStylePredictor` - scripted behavior for tests

mod http_client;
mod mock;

pub use http_client::{HttpStylePredictor, PredictionServiceConfig};
pub use mock::MockStylePredictor;
