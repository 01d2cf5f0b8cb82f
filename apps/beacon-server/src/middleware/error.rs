//! Error handling - maps failures to the API's `{"error": "..."}` bodies.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use beacon_shared::ErrorBody;
use std::fmt;

/// Application-level error type for handler failures.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg) => ErrorBody::new(msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ErrorBody::new("Internal server error")
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

// Conversion from domain errors
impl From<beacon_core::error::DomainError> for AppError {
    fn from(err: beacon_core::error::DomainError) -> Self {
        match err {
            beacon_core::error::DomainError::NotFound { entity, id } => {
                AppError::NotFound(format!("{} not found: {}", entity, id))
            }
            beacon_core::error::DomainError::Validation(msg) => AppError::BadRequest(msg),
            beacon_core::error::DomainError::Unauthorized => {
                AppError::Unauthorized("Authentication required".to_string())
            }
            beacon_core::error::DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<beacon_core::error::RepoError> for AppError {
    fn from(err: beacon_core::error::RepoError) -> Self {
        match err {
            beacon_core::error::RepoError::NotFound => {
                AppError::NotFound("Resource not found".to_string())
            }
            beacon_core::error::RepoError::Constraint(msg) => AppError::BadRequest(msg),
            beacon_core::error::RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            beacon_core::error::RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<beacon_core::ports::AuthError> for AppError {
    fn from(err: beacon_core::ports::AuthError) -> Self {
        use beacon_core::ports::AuthError;
        match err {
            AuthError::InvalidCredentials => {
                AppError::Unauthorized("Invalid credentials".to_string())
            }
            AuthError::TokenExpired => AppError::Unauthorized("Token expired".to_string()),
            AuthError::InvalidToken(_) => AppError::Unauthorized("Invalid token".to_string()),
            AuthError::MissingAuth => {
                AppError::Unauthorized("Authentication required".to_string())
            }
            AuthError::HashingError(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
