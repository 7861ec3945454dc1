//! HTTP adapter for the learning style API.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::LearningHandlers;
pub use routes::learning_routes;
