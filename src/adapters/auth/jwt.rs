//! HS256 JWT session validator.
//!
//! Tokens are signed with a shared secret and carry the learner id in the
//! `userId` claim (`id` is accepted as an alias). Expiry is always checked.

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LearnerClaims {
    #[serde(alias = "id")]
    user_id: String,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    role: Option<String>,

    #[allow(dead_code)]
    exp: i64,
}

/// Validates HS256 tokens signed with the configured secret.
pub struct JwtSessionValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    pub fn new(secret: &Secret<String>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<LearnerClaims>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                tracing::debug!("Token expired");
                AuthError::TokenExpired
            }
            _ => {
                tracing::debug!("Token validation failed: {}", e);
                AuthError::InvalidToken
            }
        })?;
        let claims = data.claims;

        let user_id = UserId::new(&claims.user_id).map_err(|_| {
            tracing::warn!("Token carries an empty user id");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(user_id, claims.email, claims.role))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator").finish_non_exhaustive()
    }
}
