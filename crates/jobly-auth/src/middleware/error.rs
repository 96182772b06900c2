//! Error responses for authentication failures.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use jobly_api::error_body;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, oauth_error, message) = error_details(&self);

        let mut headers = HeaderMap::new();
        if status == StatusCode::UNAUTHORIZED {
            let www_auth = build_www_authenticate_header(oauth_error, &message);
            if let Ok(value) = HeaderValue::from_str(&www_auth) {
                headers.insert(header::WWW_AUTHENTICATE, value);
            }
        } else {
            tracing::error!(error = %self, "Authentication failed on the server side");
        }

        let body = if status.is_server_error() {
            error_body("Internal Server Error", status)
        } else {
            error_body(message, status)
        };

        (status, headers, Json(body)).into_response()
    }
}

/// Returns (HTTP status, OAuth error code, message).
fn error_details(error: &AuthError) -> (StatusCode, &'static str, String) {
    match error {
        AuthError::Unauthorized { message } => {
            (StatusCode::UNAUTHORIZED, "unauthorized", message.clone())
        }
        AuthError::InvalidToken { message } => {
            (StatusCode::UNAUTHORIZED, "invalid_token", message.clone())
        }
        AuthError::TokenExpired => (
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Token has expired".to_string(),
        ),
        AuthError::Configuration { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "server_error",
            message.clone(),
        ),
    }
}

/// Format: `Bearer realm="jobly", error="invalid_token", error_description="..."`
fn build_www_authenticate_header(error: &str, description: &str) -> String {
    let escaped_desc = description.replace('\"', "\\\"");
    format!("Bearer realm=\"jobly\", error=\"{error}\", error_description=\"{escaped_desc}\"")
}
