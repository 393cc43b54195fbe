//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::MmlloError;

/// Error response body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

/// API error type carrying an HTTP status and a client-safe message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Create a bad request error (400).
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Create an unauthorized error (401).
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Create a forbidden error (403).
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Create a not found error (404).
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Create an internal server error (500).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// The HTTP status this error renders as.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<MmlloError> for ApiError {
    fn from(err: MmlloError) -> Self {
        match &err {
            MmlloError::Auth(msg) => ApiError::unauthorized(msg.clone()),
            MmlloError::AccessDenied(msg) => ApiError::forbidden(msg.clone()),
            MmlloError::NotFound(_) => ApiError::not_found(err.to_string()),
            MmlloError::Validation(msg) => ApiError::bad_request(msg.clone()),
            MmlloError::Conflict(msg) => ApiError::bad_request(msg.clone()),
            _ => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                MmlloError::Auth("bad token".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                MmlloError::AccessDenied("not yours".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (
                MmlloError::NotFound("board".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                MmlloError::Validation("title is required".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                MmlloError::Conflict("already a member".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                MmlloError::Database("disk full".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_internal_message_is_generic() {
        let api: ApiError = MmlloError::Database("secret path leaked".to_string()).into();
        assert_eq!(api.message, "An internal error occurred");
    }

    #[test]
    fn test_not_found_message() {
        let api: ApiError = MmlloError::NotFound("card".to_string()).into();
        assert_eq!(api.message, "card not found");
    }
}
