pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;
pub mod service;


// Re-export for main backend
pub use error::StripeError;
pub use handlers::StripeState;
pub use logic::{CreateCheckoutRequest, CreateCheckoutResponse, WebhookOutcome};
pub use routes::{router, routes};
pub use service::StripeGateway;
