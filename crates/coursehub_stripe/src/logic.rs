use chrono::Utc;
use constant_time_eq::constant_time_eq;
use coursehub_common::services::{CheckoutSessionRequest, NewPrice, NewProduct, PaymentGateway};
use coursehub_common::AuthUser;
use coursehub_config::StripeConfig;
use coursehub_db::{Course, CourseRepository, NewPurchase, PurchaseRecord, PurchaseRepository};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::StripeError;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Metadata keys written on products and sessions, read back by the webhook.
pub const METADATA_COURSE_ID: &str = "course_id";
pub const METADATA_COURSE_SLUG: &str = "course_slug";
pub const METADATA_USER_ID: &str = "user_id";

// --- Data Structures ---

/// Request from the storefront to start buying a course.
///
/// The buyer is the bearer of the request's token; `userId`, when sent,
/// must name the same user.
#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    #[cfg_attr(feature = "openapi", schema(example = "5f0c7b7e-8a4e-4f7e-9d55-2c1a3f1b8e21"))]
    pub course_id: Option<String>,
    pub user_id: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = "learner@example.com"))]
    pub user_email: Option<String>,
    #[cfg_attr(
        feature = "openapi",
        schema(example = "https://shop.example.com/purchase-success?course=timber-framing")
    )]
    pub success_url: Option<String>,
    #[cfg_attr(feature = "openapi", schema(example = "https://shop.example.com/courses/timber-framing"))]
    pub cancel_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutResponse {
    #[cfg_attr(feature = "openapi", schema(example = "cs_test_a1..."))]
    pub session_id: String,
    #[cfg_attr(
        feature = "openapi",
        schema(example = "https://checkout.stripe.com/c/pay/cs_test_a1...")
    )]
    pub url: String,
}

/// Represents the `data` field within a Stripe Event.
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeEventData {
    /// The object the event is about; its shape depends on the event type.
    pub object: serde_json::Value,
}

/// Represents the outer Stripe Event object.
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeEvent {
    pub id: String,
    #[serde(default)]
    pub api_version: Option<String>,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub livemode: bool,
    #[serde(rename = "type")]
    pub event_type: String, // e.g., "checkout.session.completed"
    pub data: StripeEventData,
}

/// The `data.object` of checkout session events, reduced to the fields used here.
#[derive(Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StripeCheckoutSessionObject {
    pub id: String,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub metadata: Option<BTreeMap<String, String>>,
    /// Plain id unless the event was expanded.
    pub payment_intent: Option<serde_json::Value>,
    pub payment_status: Option<String>, // "paid", "unpaid", "no_payment_required"
    pub status: Option<String>,
}

impl StripeCheckoutSessionObject {
    fn payment_intent_id(&self) -> Option<String> {
        match &self.payment_intent {
            Some(serde_json::Value::String(id)) => Some(id.clone()),
            Some(serde_json::Value::Object(obj)) => {
                obj.get("id").and_then(|v| v.as_str()).map(str::to_string)
            }
            _ => None,
        }
    }

    fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// What a verified webhook delivery resulted in.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    PurchaseRecorded { user_id: String, course_id: Uuid },
    /// Redelivery, or a second event for the same purchase.
    AlreadyRecorded,
    /// Session completed but the money has not arrived yet.
    AwaitingPayment,
    Logged,
    Unhandled,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct WebhookAck {
    pub received: bool,
}

/// Purchase confirmation shown after the buyer returns from Stripe.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CheckoutSessionStatus {
    pub session_id: String,
    pub payment_status: Option<String>,
    pub course_id: Option<Uuid>,
    pub course_slug: Option<String>,
    /// True once the webhook has recorded the purchase.
    pub purchase_recorded: bool,
}

// --- Checkout ---

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Creates a Checkout Session for one course, provisioning the Stripe
/// product and price on first sale.
pub async fn create_checkout<C, P, G>(
    courses: &C,
    purchases: &P,
    gateway: &G,
    stripe_config: &StripeConfig,
    user: &AuthUser,
    request: CreateCheckoutRequest,
) -> Result<CreateCheckoutResponse, StripeError>
where
    C: CourseRepository + Sync,
    P: PurchaseRepository + Sync,
    G: PaymentGateway<Error = StripeError> + ?Sized,
{
    let course_id = non_empty(request.course_id);
    let success_url = non_empty(request.success_url).or_else(|| stripe_config.success_url.clone());
    let cancel_url = non_empty(request.cancel_url).or_else(|| stripe_config.cancel_url.clone());

    let (Some(course_id), Some(success_url), Some(cancel_url)) = (course_id, success_url, cancel_url)
    else {
        return Err(StripeError::InvalidRequest(
            "Missing required fields".to_string(),
        ));
    };

    if let Some(claimed) = non_empty(request.user_id) {
        if claimed != user.user_id {
            warn!(
                "[Stripe Logic] Checkout for user {} requested by {}",
                claimed, user.user_id
            );
            return Err(StripeError::Forbidden(
                "Cannot start a checkout for another user".to_string(),
            ));
        }
    }

    let course_id = Uuid::parse_str(&course_id).map_err(|_| StripeError::CourseNotFound)?;
    let course = courses
        .find_published_by_id(course_id)
        .await?
        .ok_or(StripeError::CourseNotFound)?;

    if purchases.has_purchased(&user.user_id, course.id).await? {
        return Err(StripeError::AlreadyPurchased);
    }

    let price_id = ensure_stripe_price(courses, gateway, stripe_config, &course).await?;

    let customer_email = non_empty(request.user_email).or_else(|| user.email.clone());

    let mut metadata = BTreeMap::new();
    metadata.insert(METADATA_COURSE_ID.to_string(), course.id.to_string());
    metadata.insert(METADATA_USER_ID.to_string(), user.user_id.clone());

    info!(
        "[Stripe Logic] Creating Checkout Session for course {} and user {}",
        course.slug, user.user_id
    );

    let session = gateway
        .create_checkout_session(CheckoutSessionRequest {
            price_id,
            quantity: 1,
            success_url,
            cancel_url,
            customer_email,
            metadata,
            allow_promotion_codes: stripe_config.allow_promotion_codes,
        })
        .await?;

    let url = session.url.ok_or(StripeError::MissingCheckoutUrl)?;

    Ok(CreateCheckoutResponse {
        session_id: session.id,
        url,
    })
}

/// Returns the course's Stripe price id, creating product and price when the
/// course has never been sold before.
pub async fn ensure_stripe_price<C, G>(
    courses: &C,
    gateway: &G,
    stripe_config: &StripeConfig,
    course: &Course,
) -> Result<String, StripeError>
where
    C: CourseRepository + Sync,
    G: PaymentGateway<Error = StripeError> + ?Sized,
{
    if let Some(price_id) = course.stripe_price_id.as_ref().filter(|p| !p.is_empty()) {
        return Ok(price_id.clone());
    }

    info!(
        "[Stripe Logic] Course {} has no Stripe price yet, provisioning",
        course.slug
    );

    let mut metadata = BTreeMap::new();
    metadata.insert(METADATA_COURSE_ID.to_string(), course.id.to_string());
    metadata.insert(METADATA_COURSE_SLUG.to_string(), course.slug.clone());

    let product = gateway
        .create_product(NewProduct {
            name: course.title.clone(),
            description: course.description.clone(),
            metadata,
        })
        .await?;

    let price = gateway
        .create_price(NewPrice {
            product_id: product.id.clone(),
            unit_amount: course.price_cents,
            currency: stripe_config.currency.clone(),
        })
        .await?;

    courses
        .set_stripe_ids(course.id, &product.id, &price.id)
        .await?;

    Ok(price.id)
}

// --- Webhook Processing Logic ---

/// Verifies the `Stripe-Signature` header of a webhook delivery.
///
/// The header carries `t=<unix seconds>` and one or more `v1=<hex>` entries;
/// a delivery is authentic when any `v1` equals `HMAC-SHA256(secret, "{t}.{body}")`.
/// A positive `tolerance_seconds` also rejects timestamps further than that from `now`.
pub fn verify_stripe_signature(
    payload_bytes: &[u8],
    sig_header: Option<&str>,
    secret: &str,
    tolerance_seconds: i64,
    now: i64,
) -> Result<(), StripeError> {
    let sig_header_value = sig_header.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing Stripe-Signature header".to_string())
    })?;

    let mut timestamp_str: Option<&str> = None;
    let mut v1_signatures_hex: Vec<&str> = Vec::new();

    for item in sig_header_value.split(',') {
        if let Some((key, value)) = item.trim().split_once('=') {
            match key {
                "t" => timestamp_str = Some(value),
                "v1" => v1_signatures_hex.push(value),
                _ => {} // v0 and future schemes
            }
        }
    }

    let timestamp_str = timestamp_str.ok_or_else(|| {
        StripeError::WebhookSignatureError("Missing timestamp 't' in Stripe-Signature".to_string())
    })?;
    let parsed_timestamp = timestamp_str.parse::<i64>().map_err(|_| {
        StripeError::WebhookSignatureError(
            "Invalid timestamp format in Stripe-Signature".to_string(),
        )
    })?;

    if v1_signatures_hex.is_empty() {
        return Err(StripeError::WebhookSignatureError(
            "Missing v1 signature in Stripe-Signature".to_string(),
        ));
    }

    if tolerance_seconds > 0 && now.abs_diff(parsed_timestamp) > tolerance_seconds.unsigned_abs() {
        warn!(
            "[Stripe Webhook] Timestamp outside tolerance. Current: {}, Event: {}",
            now, parsed_timestamp
        );
        return Err(StripeError::WebhookSignatureError(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let calculated_signature_hex = compute_signature(secret, timestamp_str, payload_bytes)?;

    if v1_signatures_hex.iter().any(|provided| {
        constant_time_eq(calculated_signature_hex.as_bytes(), provided.as_bytes())
    }) {
        return Ok(());
    }

    debug!("[Stripe Webhook] No v1 signature matched");
    Err(StripeError::WebhookSignatureError(
        "Signature mismatch".to_string(),
    ))
}

/// Hex HMAC-SHA256 over `"{timestamp}.{payload}"`.
pub fn compute_signature(
    secret: &str,
    timestamp: &str,
    payload_bytes: &[u8],
) -> Result<String, StripeError> {
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
        StripeError::WebhookSignatureError("Invalid webhook secret format for HMAC".to_string())
    })?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload_bytes);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies and parses a webhook delivery using the current clock.
pub fn parse_verified_event(
    payload_bytes: &[u8],
    sig_header: Option<&str>,
    stripe_config: &StripeConfig,
) -> Result<StripeEvent, StripeError> {
    verify_stripe_signature(
        payload_bytes,
        sig_header,
        &stripe_config.webhook_secret,
        stripe_config.webhook_tolerance_seconds,
        Utc::now().timestamp(),
    )?;
    serde_json::from_slice(payload_bytes).map_err(|e| {
        StripeError::WebhookProcessingError(format!("Invalid payload format: {}", e))
    })
}

/// Processes a verified Stripe webhook event.
///
/// Purchases are keyed on `(user, course)`, never on the event id, so a
/// redelivered or duplicate event lands as [`WebhookOutcome::AlreadyRecorded`].
pub async fn process_stripe_webhook<P>(
    purchases: &P,
    event: StripeEvent,
) -> Result<WebhookOutcome, StripeError>
where
    P: PurchaseRepository + Sync,
{
    info!(
        "[Stripe Webhook] Processing event {} of type {}",
        event.id, event.event_type
    );

    match event.event_type.as_str() {
        "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
            let session: StripeCheckoutSessionObject = serde_json::from_value(event.data.object)
                .map_err(|e| {
                    StripeError::WebhookProcessingError(format!(
                        "Failed to parse checkout session object: {}",
                        e
                    ))
                })?;
            record_checkout_purchase(purchases, &session).await
        }
        "payment_intent.succeeded" => {
            let payment_intent_id = event.data.object.get("id").and_then(|v| v.as_str());
            info!("[Stripe Webhook] PaymentIntent succeeded: {:?}", payment_intent_id);
            Ok(WebhookOutcome::Logged)
        }
        "payment_intent.payment_failed" => {
            let payment_intent_id = event.data.object.get("id").and_then(|v| v.as_str());
            warn!("[Stripe Webhook] PaymentIntent failed: {:?}", payment_intent_id);
            Ok(WebhookOutcome::Logged)
        }
        _ => {
            info!(
                "[Stripe Webhook] Received unhandled event type: {}",
                event.event_type
            );
            Ok(WebhookOutcome::Unhandled)
        }
    }
}

async fn record_checkout_purchase<P>(
    purchases: &P,
    session: &StripeCheckoutSessionObject,
) -> Result<WebhookOutcome, StripeError>
where
    P: PurchaseRepository + Sync,
{
    let (Some(course_id), Some(user_id)) = (
        session.metadata_value(METADATA_COURSE_ID),
        session.metadata_value(METADATA_USER_ID),
    ) else {
        warn!(
            "[Stripe Webhook] Session {} is missing course_id/user_id metadata",
            session.id
        );
        return Err(StripeError::MissingMetadata(
            "course_id and user_id are required".to_string(),
        ));
    };

    let course_id = Uuid::parse_str(course_id).map_err(|_| {
        StripeError::MissingMetadata(format!("course_id '{}' is not a valid id", course_id))
    })?;

    let paid = matches!(
        session.payment_status.as_deref(),
        Some("paid") | Some("no_payment_required")
    );
    if !paid {
        info!(
            "[Stripe Webhook] Session {} completed with payment status {:?}; waiting for payment",
            session.id, session.payment_status
        );
        return Ok(WebhookOutcome::AwaitingPayment);
    }

    let record = purchases
        .record_purchase(NewPurchase {
            user_id: user_id.to_string(),
            course_id,
            stripe_payment_intent_id: session.payment_intent_id(),
            stripe_checkout_session_id: Some(session.id.clone()),
            amount_cents: session.amount_total.unwrap_or(0),
        })
        .await?;

    match record {
        PurchaseRecord::Created(purchase) => {
            info!(
                "[Stripe Webhook] Purchase {} recorded for user {} and course {}",
                purchase.id, user_id, course_id
            );
            Ok(WebhookOutcome::PurchaseRecorded {
                user_id: user_id.to_string(),
                course_id,
            })
        }
        PurchaseRecord::AlreadyRecorded => {
            info!(
                "[Stripe Webhook] Purchase for user {} and course {} already exists",
                user_id, course_id
            );
            Ok(WebhookOutcome::AlreadyRecorded)
        }
    }
}

// --- Confirmation ---

/// Reports on a checkout session that belongs to the caller.
pub async fn checkout_session_status<C, P, G>(
    courses: &C,
    purchases: &P,
    gateway: &G,
    user: &AuthUser,
    session_id: &str,
) -> Result<CheckoutSessionStatus, StripeError>
where
    C: CourseRepository + Sync,
    P: PurchaseRepository + Sync,
    G: PaymentGateway<Error = StripeError> + ?Sized,
{
    if session_id.trim().is_empty() {
        return Err(StripeError::InvalidRequest(
            "session_id is required".to_string(),
        ));
    }

    let session = gateway.retrieve_checkout_session(session_id).await?;

    if session.metadata.get(METADATA_USER_ID) != Some(&user.user_id) {
        return Err(StripeError::Forbidden(
            "Checkout session belongs to another user".to_string(),
        ));
    }

    let course_id = session
        .metadata
        .get(METADATA_COURSE_ID)
        .and_then(|id| Uuid::parse_str(id).ok());

    let (course_slug, purchase_recorded) = match course_id {
        Some(course_id) => {
            let slug = courses
                .find_published_by_id(course_id)
                .await?
                .map(|c| c.slug);
            let recorded = purchases.has_purchased(&user.user_id, course_id).await?;
            (slug, recorded)
        }
        None => (None, false),
    };

    Ok(CheckoutSessionStatus {
        session_id: session.id,
        payment_status: session.payment_status,
        course_id,
        course_slug,
        purchase_recorded,
    })
}
