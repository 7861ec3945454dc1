//! Authentication types for the domain layer.
//!
//! These types represent an authenticated learner extracted from a token.
//! They have **no external dependencies** - any token issuer can populate
//! them via the `SessionValidator` port.

use super::UserId;
use thiserror::Error;

/// Authenticated user extracted from a validated token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    /// The unique user identifier (`userId` claim).
    pub id: UserId,

    /// Email address, when the token carries one.
    pub email: Option<String>,

    /// Role claim (e.g. `student`, `teacher`), when present.
    pub role: Option<String>,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(id: UserId, email: Option<String>, role: Option<String>) -> Self {
        Self { id, email, role }
    }

    /// Creates a user that carries only an identifier.
    pub fn with_id(id: UserId) -> Self {
        Self::new(id, None, None)
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired (separate from InvalidToken for specific handling).
    #[error("Token expired")]
    TokenExpired,

    /// The validator could not be reached or is misconfigured.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_user_with_id_has_no_claims() {
        let user = AuthenticatedUser::with_id(UserId::new("learner-1").unwrap());

        assert_eq!(user.id.as_str(), "learner-1");
        assert!(user.email.is_none());
        assert!(user.role.is_none());
    }

    #[test]
    fn auth_error_service_unavailable_displays_message() {
        let err = AuthError::service_unavailable("missing secret");
        assert_eq!(format!("{}", err), "Auth service unavailable: missing secret");
    }

    #[test]
    fn auth_error_requires_reauthentication_for_token_errors() {
        assert!(AuthError::InvalidToken.requires_reauthentication());
        assert!(AuthError::TokenExpired.requires_reauthentication());
        assert!(!AuthError::service_unavailable("").requires_reauthentication());
    }
}
