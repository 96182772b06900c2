//! Admin authentication extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::error::AuthError;

use super::auth::{AuthState, BearerAuth};

/// Admin authentication context.
///
/// Requires a valid bearer token whose `isAdmin` claim is `true`. A
/// non-admin token is rejected with 401, the same as a missing one.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// Username for display/logging.
    pub username: String,
}

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerAuth(auth) = BearerAuth::from_request_parts(parts, state).await?;

        if !auth.is_admin {
            tracing::debug!(username = %auth.username, "Admin access denied");
            return Err(AuthError::unauthorized("Admin access required"));
        }

        tracing::debug!(username = %auth.username, "Admin access granted");

        Ok(Self {
            username: auth.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::{Request, header::AUTHORIZATION};

    use crate::token::JwtService;

    async fn extract(state: &AuthState, token: &str) -> Result<AdminAuth, AuthError> {
        let mut parts = Request::builder()
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts()
            .0;
        AdminAuth::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn test_admin_token_is_accepted() {
        let state = AuthState::new(Arc::new(JwtService::new("secret-dev", None)));
        let token = state.jwt_service.create_token("admin", true).unwrap();
        let admin = extract(&state, &token).await.unwrap();
        assert_eq!(admin.username, "admin");
    }

    #[tokio::test]
    async fn test_non_admin_token_is_unauthorized() {
        let state = AuthState::new(Arc::new(JwtService::new("secret-dev", None)));
        let token = state.jwt_service.create_token("u1", false).unwrap();
        let err = extract(&state, &token).await.unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized { .. }));
    }
}
