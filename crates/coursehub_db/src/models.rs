//! Row types for the four tables plus the insert payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stripe_product_id: Option<String>,
    pub stripe_price_id: Option<String>,
    pub thumbnail_url: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Pdf,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct CourseContent {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub content_url: String,
    pub order_index: i64,
    pub duration_seconds: i64,
    pub is_preview: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: String,
    pub course_id: Uuid,
    pub stripe_payment_intent_id: Option<String>,
    pub stripe_checkout_session_id: Option<String>,
    pub amount_cents: i64,
    pub purchased_at: DateTime<Utc>,
}

#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Progress {
    pub id: Uuid,
    pub user_id: String,
    pub content_id: Uuid,
    pub completed: bool,
    pub last_position_seconds: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub price_cents: i64,
    pub thumbnail_url: Option<String>,
    pub published: bool,
}

#[derive(Debug, Clone)]
pub struct NewContent {
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub content_type: ContentType,
    pub content_url: String,
    pub order_index: i64,
    pub duration_seconds: i64,
    pub is_preview: bool,
}

/// Payment facts captured when a checkout completes.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub user_id: String,
    pub course_id: Uuid,
    pub stripe_payment_intent_id: Option<String>,
    pub stripe_checkout_session_id: Option<String>,
    pub amount_cents: i64,
}

/// Outcome of [`crate::PurchaseRepository::record_purchase`].
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseRecord {
    Created(Purchase),
    /// A purchase for this user and course already existed; nothing was written.
    AlreadyRecorded,
}
