use std::fmt;
use thiserror::Error;

/// The base error type shared by all coursehub crates.
///
/// Crate specific errors (`DbError`, `StripeError`) convert into this type so
/// handlers can return a single error and let [`crate::http`] render it.
#[derive(Error, Debug)]
pub enum CoursehubError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Missing or invalid credentials
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Authenticated, but not allowed to touch the resource
    #[error("Forbidden: {0}")]
    ForbiddenError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    /// External service could not be reached or answered garbage
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// External service answered with an error status that is passed through
    #[error("{service_name} error: {message}")]
    UpstreamError {
        service_name: String,
        status: u16,
        message: String,
    },

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),
}

/// Maps errors onto HTTP status codes.
pub trait HttpStatusCode {
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for CoursehubError {
    fn status_code(&self) -> u16 {
        match self {
            CoursehubError::HttpError(_) => 500,
            CoursehubError::ParseError(_) => 400,
            CoursehubError::ConfigError(_) => 500,
            CoursehubError::AuthError(_) => 401,
            CoursehubError::ForbiddenError(_) => 403,
            CoursehubError::ValidationError(_) => 400,
            CoursehubError::DatabaseError(_) => 500,
            CoursehubError::ExternalServiceError { .. } => 502,
            CoursehubError::UpstreamError { status, .. } => {
                if (400..600).contains(status) {
                    *status
                } else {
                    502
                }
            }
            CoursehubError::ConflictError(_) => 409,
            CoursehubError::NotFoundError(_) => 404,
        }
    }
}

impl From<reqwest::Error> for CoursehubError {
    fn from(err: reqwest::Error) -> Self {
        CoursehubError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for CoursehubError {
    fn from(err: serde_json::Error) -> Self {
        CoursehubError::ParseError(err.to_string())
    }
}

// Utility functions for error handling
pub fn auth_error<T: fmt::Display>(message: T) -> CoursehubError {
    CoursehubError::AuthError(message.to_string())
}

pub fn forbidden<T: fmt::Display>(message: T) -> CoursehubError {
    CoursehubError::ForbiddenError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> CoursehubError {
    CoursehubError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> CoursehubError {
    CoursehubError::ConflictError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> CoursehubError {
    CoursehubError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
