//! Bearer authentication.
//!
//! Users sign in with the external auth provider, which hands the browser an
//! HS256 JWT. Every authenticated request carries it as
//! `Authorization: Bearer <token>`; the `sub` claim is the user id used as
//! owner of purchases and progress rows.

use axum::{
    extract::{FromRef, FromRequestParts, OptionalFromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use coursehub_config::AuthConfig;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{auth_error, CoursehubError};

/// Claims read from the provider's token. Issuer and audience are checked by
/// [`Validation`] directly on the raw payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize,
}

/// The caller, as established from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct AuthVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl AuthVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = config.issuer.as_deref() {
            validation.set_issuer(&[issuer]);
        }
        match config.audience.as_deref() {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, CoursehubError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            debug!("rejected bearer token: {}", e);
            auth_error("Invalid or expired token")
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(auth_error("Token has no subject"));
        }

        Ok(AuthUser {
            user_id: data.claims.sub,
            email: data.claims.email.filter(|e| !e.is_empty()),
        })
    }
}

/// `Ok(None)` when no Authorization header is present at all.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, CoursehubError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| auth_error("Malformed authorization header"))?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| auth_error("Expected 'Bearer <token>'"))?;
    Ok(Some(token))
}

impl<S> FromRequestParts<S> for AuthUser
where
    AuthVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = CoursehubError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or_else(|| auth_error("Missing bearer token"))?;
        AuthVerifier::from_ref(state).verify(token)
    }
}

/// Anonymous callers get `None`; a token that is present but invalid is still rejected.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    AuthVerifier: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = CoursehubError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => AuthVerifier::from_ref(state).verify(token).map(Some),
            None => Ok(None),
        }
    }
}
