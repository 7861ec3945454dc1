//! Session validation port for access token validation.
//!
//! This port defines the contract for validating access tokens and extracting
//! user identity. The production implementation verifies HS256 JWTs; tests
//! use an in-memory token table.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
///
/// HTTP middleware uses this to validate Bearer tokens (or the `token`
/// cookie) and extract the authenticated user.
///
/// # Contract
///
/// Implementations must:
/// - Validate the token signature
/// - Validate the expiry claim when present
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
/// - Return `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate an access token and return the authenticated user.
    ///
    /// `token` is the raw token, without any "Bearer " prefix.
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
