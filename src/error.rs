//! Error types for mmllo.

use thiserror::Error;

/// Common error type for mmllo.
#[derive(Error, Debug)]
pub enum MmlloError {
    /// Database error.
    ///
    /// This is a generic database error that wraps errors from any storage
    /// backend. Database errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Database connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error (invalid credentials, invalid or expired token).
    #[error("authentication error: {0}")]
    Auth(String),

    /// Access denied: the user is authenticated but not authorized.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Conflict with existing state (duplicate unique key).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors.
impl From<sqlx::Error> for MmlloError {
    fn from(e: sqlx::Error) -> Self {
        MmlloError::Database(e.to_string())
    }
}

/// Result type alias for mmllo operations.
pub type Result<T> = std::result::Result<T, MmlloError>;
