//! Bearer token authentication extractor.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AuthError;
use crate::token::JwtService;

// =============================================================================
// Auth State
// =============================================================================

/// State required for bearer token authentication.
///
/// Include it in the application state and expose it to the extractors
/// through `FromRef`.
#[derive(Clone, Debug)]
pub struct AuthState {
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
}

impl AuthState {
    /// Creates a new auth state.
    pub fn new(jwt_service: Arc<JwtService>) -> Self {
        Self { jwt_service }
    }
}

// =============================================================================
// Auth Context
// =============================================================================

/// The authenticated user of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
    pub is_admin: bool,
}

// =============================================================================
// Bearer Auth Extractor
// =============================================================================

/// Axum extractor that validates `Authorization: Bearer <token>`.
///
/// # Errors
///
/// Rejects with `AuthError` (401) if the header is missing or malformed, or
/// the token is invalid or expired.
pub struct BearerAuth(pub AuthContext);

/// Reads the bearer token from the `Authorization` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let token = bearer_token(parts)
            .ok_or_else(|| AuthError::unauthorized("Missing Authorization header"))?;

        let claims = auth_state.jwt_service.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode token");
            AuthError::from(e)
        })?;

        Ok(Self(AuthContext {
            username: claims.username,
            is_admin: claims.is_admin,
        }))
    }
}
