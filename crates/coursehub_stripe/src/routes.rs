use crate::handlers::{
    checkout_session_handler, create_checkout_handler, stripe_webhook_handler, StripeState,
};
use crate::service::StripeGateway;
use axum::{
    routing::{get, post},
    Router,
};
use coursehub_common::AuthVerifier;
use coursehub_config::StripeConfig;
use coursehub_db::Repositories;
use std::sync::Arc;

/// Creates a router containing all routes for the Stripe feature, talking to
/// the real Stripe API.
pub fn routes(config: Arc<StripeConfig>, repos: Repositories, auth: AuthVerifier) -> Router {
    let gateway = Arc::new(StripeGateway::new(&config));
    router(StripeState {
        config,
        gateway,
        repos,
        auth,
    })
}

/// Router over an explicit state, so the gateway can be swapped.
pub fn router(state: StripeState) -> Router {
    Router::new()
        .route("/stripe/create-checkout", post(create_checkout_handler))
        .route("/stripe/webhook", post(stripe_webhook_handler))
        .route("/stripe/checkout-session", get(checkout_session_handler))
        .with_state(state)
}
