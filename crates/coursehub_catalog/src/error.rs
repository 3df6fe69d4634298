use coursehub_common::{CoursehubError, HttpStatusCode};
use coursehub_db::DbError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Course not found")]
    CourseNotFound,

    #[error("Content {0} not found")]
    ContentNotFound(Uuid),

    /// The caller owns neither the course nor a preview of this item
    #[error("Course has not been purchased")]
    NotPurchased,

    #[error("Invalid progress: {0}")]
    InvalidProgress(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<CatalogError> for CoursehubError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::CourseNotFound => CoursehubError::NotFoundError(err.to_string()),
            CatalogError::ContentNotFound(_) => CoursehubError::NotFoundError(err.to_string()),
            CatalogError::NotPurchased => CoursehubError::ForbiddenError(err.to_string()),
            CatalogError::InvalidProgress(msg) => CoursehubError::ValidationError(msg),
            CatalogError::Database(e) => e.into(),
        }
    }
}

impl HttpStatusCode for CatalogError {
    fn status_code(&self) -> u16 {
        match self {
            CatalogError::CourseNotFound | CatalogError::ContentNotFound(_) => 404,
            CatalogError::NotPurchased => 403,
            CatalogError::InvalidProgress(_) => 400,
            CatalogError::Database(DbError::NotFound(_)) => 404,
            CatalogError::Database(_) => 500,
        }
    }
}
