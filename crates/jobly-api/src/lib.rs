use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jobly_storage::StorageError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// -------------------------
// Error envelope
// -------------------------

/// The body of every error response:
/// `{"error": {"message": ..., "status": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: ErrorMessage,
    pub status: u16,
}

/// A single message, or one message per failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    Single(String),
    List(Vec<String>),
}

impl ErrorEnvelope {
    pub fn new(message: ErrorMessage, status: StatusCode) -> Self {
        Self {
            error: ErrorDetail {
                message,
                status: status.as_u16(),
            },
        }
    }
}

/// Builds the error envelope as a JSON value.
#[must_use]
pub fn error_body(message: impl Into<String>, status: StatusCode) -> Value {
    serde_json::to_value(ErrorEnvelope::new(
        ErrorMessage::Single(message.into()),
        status,
    ))
    .unwrap_or(Value::Null)
}

// -------------------------
// API errors
// -------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// Request validation failed; one message per broken rule.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn validation(errors: Vec<String>) -> Self {
        Self::Validation(errors)
    }
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The envelope sent to the client. Internal details are not exposed.
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let message = match self {
            ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) | ApiError::NotFound(msg) => {
                ErrorMessage::Single(msg.clone())
            }
            ApiError::Validation(errors) => ErrorMessage::List(errors.clone()),
            ApiError::Internal(_) => ErrorMessage::Single("Internal Server Error".to_string()),
        };
        ErrorEnvelope::new(message, self.status_code())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            StorageError::InvalidResource { message } => ApiError::BadRequest(message),
            StorageError::ConnectionError { .. } | StorageError::Internal { .. } => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }
        (status, Json(self.to_envelope())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};

    #[test]
    fn into_response_sets_status_and_content_type() {
        let resp = ApiError::bad_request("Invalid parameter").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap();
        assert_eq!(content_type, &HeaderValue::from_static("application/json"));
    }

    #[test]
    fn envelope_shape() {
        let value = serde_json::to_value(ApiError::not_found("Job not found: 0").to_envelope())
            .unwrap();
        assert_eq!(
            value,
            serde_json::json!({"error": {"message": "Job not found: 0", "status": 404}})
        );

        let value = serde_json::to_value(
            ApiError::validation(vec!["a".into(), "b".into()]).to_envelope(),
        )
        .unwrap();
        assert_eq!(value["error"]["message"], serde_json::json!(["a", "b"]));
        assert_eq!(value["error"]["status"], 400);
    }

    #[test]
    fn internal_errors_are_not_leaked() {
        let envelope = ApiError::internal("connection refused").to_envelope();
        assert_eq!(
            envelope.error.message,
            ErrorMessage::Single("Internal Server Error".into())
        );
        assert_eq!(envelope.error.status, 500);
    }

    #[test]
    fn storage_errors_map_to_status() {
        let cases: Vec<(StorageError, StatusCode)> = vec![
            (StorageError::job_not_found(1), StatusCode::NOT_FOUND),
            (StorageError::invalid_resource("No data"), StatusCode::BAD_REQUEST),
            (
                StorageError::connection_error("down"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (StorageError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }

        let err = ApiError::from(StorageError::job_not_found(7));
        assert_eq!(err.to_envelope().error.message, ErrorMessage::Single("Job not found: 7".into()));
    }

    #[test]
    fn error_body_matches_envelope() {
        let body = error_body("Unauthorized", StatusCode::UNAUTHORIZED);
        let envelope: ErrorEnvelope = serde_json::from_value(body).unwrap();
        assert_eq!(envelope.error.status, 401);
    }
}
