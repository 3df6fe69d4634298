#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::CheckoutSessionQuery;
use crate::logic::{
    CheckoutSessionStatus, CreateCheckoutRequest, CreateCheckoutResponse,
    StripeCheckoutSessionObject, StripeEvent, StripeEventData, WebhookAck,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::create_checkout_handler,
        crate::handlers::stripe_webhook_handler,
        crate::handlers::checkout_session_handler,
    ),
    components(
        schemas(
            CreateCheckoutRequest, CreateCheckoutResponse,
            StripeEvent, StripeEventData, StripeCheckoutSessionObject, WebhookAck,
            CheckoutSessionQuery, CheckoutSessionStatus
        )
    ),
    tags(
        (name = "Stripe", description = "Course checkout through Stripe"),
        (name = "Stripe Webhooks", description = "Stripe Server-to-Server Webhooks")
    )
)]
pub struct StripeApiDoc;
