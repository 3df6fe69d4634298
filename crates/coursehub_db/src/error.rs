//! Error types for the database client

use coursehub_common::error::CoursehubError;
use thiserror::Error;

/// Errors that can occur when working with the database
#[derive(Debug, Error)]
pub enum DbError {
    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Error with database transaction
    #[error("Database transaction error: {0}")]
    TransactionError(String),

    /// A row that must exist was not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<DbError> for CoursehubError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => CoursehubError::NotFoundError(what),
            DbError::ConfigError(msg) => CoursehubError::ConfigError(msg),
            other => CoursehubError::DatabaseError(other.to_string()),
        }
    }
}
