//! HTTP adapters - REST API implementations.
//!
//! - `learning` - behavior tracking and learning style endpoints
//! - `middleware` - token authentication

pub mod learning;
pub mod middleware;

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use serde_json::{json, Value};

pub use learning::{learning_routes, LearningHandlers};
pub use middleware::{auth_middleware, AuthState, RequireAuth};

/// GET /health - Liveness probe, unauthenticated
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": env!("CARGO_PKG_NAME") }))
}

/// Full API: `/health` plus the authenticated learning routes under
/// `/api/learning`.
pub fn api_router(handlers: LearningHandlers, auth: AuthState) -> Router {
    let learning = learning_routes(handlers).layer(from_fn_with_state(auth, auth_middleware));

    Router::new()
        .route("/health", get(health))
        .nest("/api/learning", learning)
}
