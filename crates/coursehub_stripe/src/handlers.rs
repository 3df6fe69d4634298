use axum::{
    body::Bytes,
    extract::{FromRef, Query, State},
    http::HeaderMap,
    response::Json,
};
use coursehub_common::services::PaymentGateway;
use coursehub_common::{AuthUser, AuthVerifier, CoursehubError};
use coursehub_config::StripeConfig;
use coursehub_db::Repositories;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::StripeError;
use crate::logic::{
    checkout_session_status, create_checkout, parse_verified_event, process_stripe_webhook,
    CheckoutSessionStatus, CreateCheckoutRequest, CreateCheckoutResponse, WebhookAck,
};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

/// Shared state of the Stripe routes.
#[derive(Clone)]
pub struct StripeState {
    pub config: Arc<StripeConfig>,
    pub gateway: Arc<dyn PaymentGateway<Error = StripeError>>,
    pub repos: Repositories,
    pub auth: AuthVerifier,
}

impl FromRef<StripeState> for AuthVerifier {
    fn from_ref(state: &StripeState) -> Self {
        state.auth.clone()
    }
}

/// Start a Stripe Checkout for one course.
#[axum::debug_handler(state = StripeState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/stripe/create-checkout", // Path relative to /api
    request_body = CreateCheckoutRequest,
    responses(
        (status = 200, description = "Stripe Checkout Session created", body = CreateCheckoutResponse),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "userId does not match the caller"),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Course already purchased"),
        (status = 502, description = "Stripe did not return a checkout URL")
    ),
    security(("bearer_auth" = [])),
    tag = "Stripe"
))]
pub async fn create_checkout_handler(
    State(state): State<StripeState>,
    user: AuthUser,
    Json(payload): Json<CreateCheckoutRequest>,
) -> Result<Json<CreateCheckoutResponse>, CoursehubError> {
    let response = create_checkout(
        &state.repos.courses,
        &state.repos.purchases,
        state.gateway.as_ref(),
        &state.config,
        &user,
        payload,
    )
    .await?;
    Ok(Json(response))
}

/// Stripe server-to-server notifications. The raw body is needed for the signature.
#[axum::debug_handler(state = StripeState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/stripe/webhook", // Path relative to /api
    request_body = crate::logic::StripeEvent,
    params(("Stripe-Signature" = String, Header, description = "t=<unix>,v1=<hex hmac>")),
    responses(
        (status = 200, description = "Webhook received and acknowledged", body = WebhookAck),
        (status = 400, description = "Invalid signature, bad payload or missing metadata"),
        (status = 500, description = "Purchase could not be stored")
    ),
    tag = "Stripe Webhooks"
))]
pub async fn stripe_webhook_handler(
    State(state): State<StripeState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, CoursehubError> {
    let sig_header = headers.get("Stripe-Signature").and_then(|h| h.to_str().ok());

    let event = parse_verified_event(&body, sig_header, &state.config).map_err(|e| {
        warn!("[Stripe Webhook] Rejected delivery: {}", e);
        e
    })?;

    let outcome = process_stripe_webhook(&state.repos.purchases, event).await?;
    info!("[Stripe Webhook] Delivery handled: {:?}", outcome);

    Ok(Json(WebhookAck { received: true }))
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(IntoParams, ToSchema))]
pub struct CheckoutSessionQuery {
    // Stripe substitutes {CHECKOUT_SESSION_ID} in the success URL
    #[cfg_attr(feature = "openapi", param(example = "cs_test_a1..."))]
    pub session_id: String,
}

/// Confirmation details for the purchase-success page.
#[axum::debug_handler(state = StripeState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/stripe/checkout-session", // Path relative to /api
    params(CheckoutSessionQuery),
    responses(
        (status = 200, description = "Checkout session status", body = CheckoutSessionStatus),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Session belongs to another user")
    ),
    security(("bearer_auth" = [])),
    tag = "Stripe"
))]
pub async fn checkout_session_handler(
    State(state): State<StripeState>,
    user: AuthUser,
    Query(params): Query<CheckoutSessionQuery>,
) -> Result<Json<CheckoutSessionStatus>, CoursehubError> {
    let status = checkout_session_status(
        &state.repos.courses,
        &state.repos.purchases,
        state.gateway.as_ref(),
        &user,
        &params.session_id,
    )
    .await?;
    Ok(Json(status))
}
