use coursehub_common::{CoursehubError, HttpStatusCode};
use coursehub_db::DbError;
use thiserror::Error;

/// Stripe-specific error types.
#[derive(Error, Debug)]
pub enum StripeError {
    /// Error occurred during a Stripe API request
    #[error("Stripe API request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// Error returned by the Stripe API
    #[error("Stripe API returned an error: {message} (Status: {status_code})")]
    ApiError { status_code: u16, message: String },

    /// Error parsing Stripe API response
    #[error("Failed to parse Stripe API response: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Stripe webhook signature verification failed: {0}")]
    WebhookSignatureError(String),

    /// The event passed verification but its payload is unusable
    #[error("Stripe webhook event processing error: {0}")]
    WebhookProcessingError(String),

    #[error("Missing metadata in checkout session: {0}")]
    MissingMetadata(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Course not found")]
    CourseNotFound,

    #[error("Course already purchased")]
    AlreadyPurchased,

    #[error("Stripe response missing checkout URL")]
    MissingCheckoutUrl,

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

/// Convert StripeError to CoursehubError
impl From<StripeError> for CoursehubError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::RequestError(e) => {
                CoursehubError::HttpError(format!("Stripe request error: {}", e))
            }
            StripeError::ApiError {
                status_code,
                message,
            } => CoursehubError::UpstreamError {
                service_name: "Stripe".to_string(),
                status: status_code,
                message,
            },
            StripeError::ParseError(e) => CoursehubError::ExternalServiceError {
                service_name: "Stripe".to_string(),
                message: format!("unreadable response: {}", e),
            },
            StripeError::WebhookSignatureError(msg)
            | StripeError::WebhookProcessingError(msg)
            | StripeError::MissingMetadata(msg) => {
                CoursehubError::ValidationError(format!("Webhook Error: {}", msg))
            }
            StripeError::InvalidRequest(msg) => CoursehubError::ValidationError(msg),
            StripeError::Forbidden(msg) => CoursehubError::ForbiddenError(msg),
            StripeError::CourseNotFound => CoursehubError::NotFoundError("Course not found".into()),
            StripeError::AlreadyPurchased => {
                CoursehubError::ConflictError("Course already purchased".into())
            }
            StripeError::MissingCheckoutUrl => CoursehubError::ExternalServiceError {
                service_name: "Stripe".to_string(),
                message: "checkout session has no URL".to_string(),
            },
            StripeError::Database(e) => e.into(),
        }
    }
}

impl HttpStatusCode for StripeError {
    fn status_code(&self) -> u16 {
        match self {
            StripeError::RequestError(_) => 500,
            StripeError::ApiError { status_code, .. } => *status_code,
            StripeError::ParseError(_) => 502,
            StripeError::WebhookSignatureError(_) => 400,
            StripeError::WebhookProcessingError(_) => 400,
            StripeError::MissingMetadata(_) => 400,
            StripeError::InvalidRequest(_) => 400,
            StripeError::Forbidden(_) => 403,
            StripeError::CourseNotFound => 404,
            StripeError::AlreadyPurchased => 409,
            StripeError::MissingCheckoutUrl => 502,
            StripeError::Database(_) => 500,
        }
    }
}
