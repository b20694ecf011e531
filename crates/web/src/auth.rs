use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use scholar_core::model::UserId;
use serde::{Deserialize, Serialize};

use crate::api_error::ApiError;

/// Bearer token payload. `sub` carries the numeric user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// HS256 keys shared by every request.
#[derive(Clone)]
pub struct AuthKeys {
    decoding: Arc<DecodingKey>,
    encoding: Arc<EncodingKey>,
}

impl AuthKeys {
    #[must_use]
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            decoding: Arc::new(DecodingKey::from_secret(secret)),
            encoding: Arc::new(EncodingKey::from_secret(secret)),
        }
    }

    /// Sign a token for `user_id` valid until `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns the signing error from `jsonwebtoken`.
    pub fn issue(
        &self,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    fn verify(&self, token: &str) -> Result<UserId, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                ApiError::Unauthenticated
            })?;
        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| ApiError::Unauthenticated)
    }
}

fn bearer(parts: &Parts) -> Result<Option<&str>, ApiError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| ApiError::Unauthenticated)?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(Some)
        .ok_or(ApiError::Unauthenticated)
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

impl<S> FromRequestParts<S> for AuthUser
where
    AuthKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer(parts)?.ok_or(ApiError::Unauthenticated)?;
        let keys = AuthKeys::from_ref(state);
        Ok(AuthUser(keys.verify(token)?))
    }
}

/// The caller if a bearer token was sent. A token that fails verification
/// is still rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeAuthUser(pub Option<UserId>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    AuthKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match bearer(parts)? {
            Some(token) => {
                let keys = AuthKeys::from_ref(state);
                Ok(MaybeAuthUser(Some(keys.verify(token)?)))
            }
            None => Ok(MaybeAuthUser(None)),
        }
    }
}
