//! [`PaymentGateway`] over the Stripe REST API.
//!
//! Requests are form encoded and authenticated with the secret key as the
//! basic-auth user. Error bodies look like `{"error": {"message": ...}}`; the
//! message and the HTTP status are surfaced through [`StripeError::ApiError`].

use crate::error::StripeError;
use coursehub_common::services::{
    BoxFuture, CheckoutSessionRequest, CheckoutSessionResult, NewPrice, NewProduct,
    PaymentGateway, PriceResult, ProductResult,
};
use coursehub_common::HTTP_CLIENT;
use coursehub_config::StripeConfig;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    secret_key: String,
    api_base: String,
    api_version: Option<String>,
}

impl StripeGateway {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            secret_key: config.secret_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.api_base, path)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.basic_auth(&self.secret_key, None::<&str>);
        match &self.api_version {
            Some(version) => builder.header("Stripe-Version", version),
            None => builder,
        }
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, StripeError> {
        let url = self.url(path);
        debug!("[Stripe] POST {}", url);
        let response = self
            .authorize(self.client.post(&url))
            .form(form)
            .send()
            .await?;
        read_response(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, StripeError> {
        let url = self.url(path);
        debug!("[Stripe] GET {}", url);
        let response = self.authorize(self.client.get(&url)).send().await?;
        read_response(response).await
    }
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StripeError> {
    let status = response.status();
    let body_text = response.text().await?;

    if status.is_success() {
        return Ok(serde_json::from_str(&body_text)?);
    }

    let message = match serde_json::from_str::<serde_json::Value>(&body_text) {
        Ok(json_body) => json_body
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or(&body_text)
            .to_string(),
        Err(_) => body_text,
    };
    error!("[Stripe] API request failed: {} - {}", status, message);
    Err(StripeError::ApiError {
        status_code: status.as_u16(),
        message,
    })
}

fn push_metadata(form: &mut Vec<(String, String)>, metadata: &BTreeMap<String, String>) {
    for (key, value) in metadata {
        form.push((format!("metadata[{}]", key), value.clone()));
    }
}

pub(crate) fn product_form(product: &NewProduct) -> Vec<(String, String)> {
    let mut form = vec![("name".to_string(), product.name.clone())];
    if let Some(description) = product.description.as_ref().filter(|d| !d.is_empty()) {
        form.push(("description".to_string(), description.clone()));
    }
    push_metadata(&mut form, &product.metadata);
    form
}

pub(crate) fn price_form(price: &NewPrice) -> Vec<(String, String)> {
    vec![
        ("product".to_string(), price.product_id.clone()),
        ("unit_amount".to_string(), price.unit_amount.to_string()),
        ("currency".to_string(), price.currency.to_lowercase()),
    ]
}

pub(crate) fn checkout_session_form(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("payment_method_types[]".to_string(), "card".to_string()),
        ("mode".to_string(), "payment".to_string()),
        ("line_items[0][price]".to_string(), request.price_id.clone()),
        (
            "line_items[0][quantity]".to_string(),
            request.quantity.to_string(),
        ),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        (
            "allow_promotion_codes".to_string(),
            request.allow_promotion_codes.to_string(),
        ),
    ];
    if let Some(email) = &request.customer_email {
        form.push(("customer_email".to_string(), email.clone()));
    }
    push_metadata(&mut form, &request.metadata);
    form
}

#[derive(Deserialize)]
struct StripeObjectId {
    id: String,
}

/// Checkout session as returned by create and retrieve. `payment_intent`
/// is a plain id unless expanded, and `metadata` may be `null`.
#[derive(Deserialize)]
pub(crate) struct StripeCheckoutSessionData {
    pub id: String,
    pub url: Option<String>,
    pub payment_status: Option<String>,
    pub payment_intent: Option<serde_json::Value>,
    pub amount_total: Option<i64>,
    pub metadata: Option<BTreeMap<String, String>>,
}

impl From<StripeCheckoutSessionData> for CheckoutSessionResult {
    fn from(data: StripeCheckoutSessionData) -> Self {
        let payment_intent = match data.payment_intent {
            Some(serde_json::Value::String(id)) => Some(id),
            Some(serde_json::Value::Object(obj)) => obj
                .get("id")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            _ => None,
        };
        CheckoutSessionResult {
            id: data.id,
            url: data.url,
            payment_status: data.payment_status,
            payment_intent,
            amount_total: data.amount_total,
            metadata: data.metadata.unwrap_or_default(),
        }
    }
}

impl PaymentGateway for StripeGateway {
    type Error = StripeError;

    fn create_product(&self, product: NewProduct) -> BoxFuture<'_, ProductResult, Self::Error> {
        Box::pin(async move {
            let created: StripeObjectId = self.post_form("products", &product_form(&product)).await?;
            info!("[Stripe] Created product {} for '{}'", created.id, product.name);
            Ok(ProductResult { id: created.id })
        })
    }

    fn create_price(&self, price: NewPrice) -> BoxFuture<'_, PriceResult, Self::Error> {
        Box::pin(async move {
            let created: StripeObjectId = self.post_form("prices", &price_form(&price)).await?;
            info!(
                "[Stripe] Created price {} ({} {}) for product {}",
                created.id, price.unit_amount, price.currency, price.product_id
            );
            Ok(PriceResult { id: created.id })
        })
    }

    fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> BoxFuture<'_, CheckoutSessionResult, Self::Error> {
        Box::pin(async move {
            let session: StripeCheckoutSessionData = self
                .post_form("checkout/sessions", &checkout_session_form(&request))
                .await?;
            info!("[Stripe] Checkout Session {} created", session.id);
            Ok(session.into())
        })
    }

    fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> BoxFuture<'_, CheckoutSessionResult, Self::Error> {
        let session_id = session_id.to_string();
        Box::pin(async move {
            if !is_valid_object_id(&session_id) {
                return Err(StripeError::InvalidRequest("Invalid session id".to_string()));
            }
            let session: StripeCheckoutSessionData =
                self.get(&format!("checkout/sessions/{}", session_id)).await?;
            Ok(session.into())
        })
    }
}

/// Stripe object ids are alphanumeric with underscores (`cs_test_a1B2`).
/// Anything else could alter the request path or query string.
pub(crate) fn is_valid_object_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
