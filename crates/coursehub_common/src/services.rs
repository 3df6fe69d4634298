//! Service abstractions for the external payments processor.
//!
//! Checkout logic only talks to [`PaymentGateway`]; the Stripe crate provides
//! the REST implementation and tests swap in a hand-written mock.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

pub trait PaymentGateway: Send + Sync {
    /// Error type returned by gateway operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Create a product that prices can be attached to.
    fn create_product(&self, product: NewProduct) -> BoxFuture<'_, ProductResult, Self::Error>;

    /// Create a one-time price for a product.
    fn create_price(&self, price: NewPrice) -> BoxFuture<'_, PriceResult, Self::Error>;

    /// Create a hosted checkout session the buyer is redirected to.
    fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> BoxFuture<'_, CheckoutSessionResult, Self::Error>;

    /// Look up a checkout session by id.
    fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> BoxFuture<'_, CheckoutSessionResult, Self::Error>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResult {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPrice {
    pub product_id: String,
    /// Amount in the currency's minor unit.
    pub unit_amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceResult {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutSessionRequest {
    pub price_id: String,
    pub quantity: u32,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub allow_promotion_codes: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CheckoutSessionResult {
    pub id: String,
    pub url: Option<String>,
    pub payment_status: Option<String>,
    pub payment_intent: Option<String>,
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}
