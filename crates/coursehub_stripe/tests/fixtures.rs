//! Test fixtures for the Stripe checkout tests
//!
//! Shared configuration, token minting and request signing.

#![allow(dead_code)]

use coursehub_common::AuthVerifier;
use coursehub_config::{AuthConfig, StripeConfig};
use coursehub_db::{Course, CourseRepository, DbClient, NewCourse, Repositories};
use coursehub_stripe::logic::compute_signature;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Creates a Stripe config pointing at the given API base
pub fn create_mock_stripe_config(api_base: &str) -> StripeConfig {
    StripeConfig {
        secret_key: "sk_test_123".to_string(),
        webhook_secret: WEBHOOK_SECRET.to_string(),
        api_base: api_base.to_string(),
        api_version: Some("2024-06-20".to_string()),
        currency: "usd".to_string(),
        success_url: Some("https://shop.example.com/purchase-success".to_string()),
        cancel_url: Some("https://shop.example.com/courses".to_string()),
        webhook_tolerance_seconds: 300,
        allow_promotion_codes: true,
    }
}

pub fn create_verifier() -> AuthVerifier {
    AuthVerifier::new(&AuthConfig {
        jwt_secret: JWT_SECRET.to_string(),
        issuer: None,
        audience: None,
    })
}

/// Mints a bearer token for the given user, valid for an hour
pub fn bearer(user_id: &str) -> String {
    let token = encode(
        &Header::default(),
        &json!({
            "sub": user_id,
            "email": format!("{user_id}@example.com"),
            "exp": chrono::Utc::now().timestamp() + 3600,
        }),
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {token}")
}

/// Builds a current `Stripe-Signature` header for the payload
pub fn sign(payload: &[u8]) -> String {
    let timestamp = chrono::Utc::now().timestamp().to_string();
    let signature = compute_signature(WEBHOOK_SECRET, &timestamp, payload).unwrap();
    format!("t={timestamp},v1={signature}")
}

pub async fn create_test_db() -> (DbClient, Repositories) {
    let db = DbClient::in_memory().await.unwrap();
    let repos = Repositories::new(&db);
    (db, repos)
}

pub async fn create_test_course(repos: &Repositories, slug: &str) -> Course {
    repos
        .courses
        .insert_course(NewCourse {
            title: "Timber Framing".to_string(),
            slug: slug.to_string(),
            description: Some("Joinery from the ground up".to_string()),
            price_cents: 4900,
            thumbnail_url: None,
            published: true,
        })
        .await
        .unwrap()
}
