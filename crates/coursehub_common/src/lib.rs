pub mod auth; // Bearer token verification and extractors
pub mod error; // Error handling
pub mod features; // Runtime feature flags
pub mod http; // HTTP utilities
pub mod logging; // Logging setup
pub mod price; // Price display
pub mod services; // Service abstractions

pub use auth::{AuthUser, AuthVerifier, Claims};

pub use error::{
    auth_error, conflict, external_service_error, forbidden, not_found, CoursehubError,
    HttpStatusCode,
};

pub use http::client::{create_client, HTTP_CLIENT};

pub use features::{is_feature_enabled, is_stripe_enabled};

pub use price::format_price;
