//! Authentication middleware and extractor for axum.
//!
//! - `auth_middleware` - validates a Bearer token (or the session cookie)
//!   and injects the user into request extensions
//! - `RequireAuth` - extractor that requires authentication
//!
//! The middleware depends only on the `SessionValidator` port, so the JWT
//! validator and the test mock plug in the same way.
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedUser into extensions
//!                                      ↓
//!                              Handler → RequireAuth extractor reads from extensions
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Auth middleware state: the validator plus the cookie checked as fallback.
#[derive(Clone)]
pub struct AuthState {
    validator: Arc<dyn SessionValidator>,
    cookie_name: Arc<str>,
}

impl AuthState {
    pub fn new(validator: Arc<dyn SessionValidator>, cookie_name: impl Into<String>) -> Self {
        Self {
            validator,
            cookie_name: Arc::from(cookie_name.into()),
        }
    }
}

/// Token from `Authorization: Bearer <token>`, else from the named cookie.
fn extract_token<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<&'a str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim())
        .filter(|v| !v.is_empty())
}

/// Authentication middleware.
///
/// A missing token passes through untouched so that `RequireAuth` decides
/// per route; an invalid or expired token is rejected here with 401.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_token(request.headers(), &auth.cookie_name).map(str::to_owned);

    let Some(token) = token else {
        return next.run(request).await;
    };

    match auth.validator.validate(&token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            let (status, message) = match &e {
                AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
                AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
                AuthError::ServiceUnavailable(msg) => {
                    tracing::error!("Auth service unavailable: {}", msg);
                    (StatusCode::SERVICE_UNAVAILABLE, "Authentication service unavailable")
                }
            };

            (
                status,
                Json(serde_json::json!({
                    "code": "AUTH_ERROR",
                    "message": message
                })),
            )
                .into_response()
        }
    }
}

/// Extractor that requires authentication.
///
/// Returns 401 when the auth middleware did not inject a user.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthRejection::Unauthenticated => (StatusCode::UNAUTHORIZED, "Authentication required"),
        };

        (
            status,
            Json(serde_json::json!({
                "code": "UNAUTHENTICATED",
                "message": message
            })),
        )
            .into_response()
    }
}
