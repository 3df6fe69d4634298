//! SQL implementation of the purchase repository

use crate::error::DbError;
use crate::models::{Course, NewPurchase, Purchase, PurchaseRecord};
use crate::repositories::purchase::PurchaseRepository;
use crate::DbClient;
use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

const PURCHASE_COLUMNS: &str = "id, user_id, course_id, stripe_payment_intent_id, \
     stripe_checkout_session_id, amount_cents, purchased_at";

#[derive(Debug, Clone)]
pub struct SqlPurchaseRepository {
    db_client: DbClient,
}

impl SqlPurchaseRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl PurchaseRepository for SqlPurchaseRepository {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Purchase>, DbError> {
        debug!("Listing purchases for user: {}", user_id);

        let query = format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE user_id = $1 \
             ORDER BY purchased_at DESC"
        );

        sqlx::query_as::<_, Purchase>(&query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list purchases: {}", e);
                DbError::QueryError(e.to_string())
            })
    }

    async fn has_purchased(&self, user_id: &str, course_id: Uuid) -> Result<bool, DbError> {
        Ok(self
            .find_for_user_and_course(user_id, course_id)
            .await?
            .is_some())
    }

    async fn purchased_courses(&self, user_id: &str) -> Result<Vec<Course>, DbError> {
        debug!("Listing purchased courses for user: {}", user_id);

        let query = r#"
            SELECT c.id, c.title, c.slug, c.description, c.price_cents, c.stripe_product_id,
                   c.stripe_price_id, c.thumbnail_url, c.published, c.created_at, c.updated_at
            FROM purchases p
            INNER JOIN courses c ON c.id = p.course_id
            WHERE p.user_id = $1
            ORDER BY p.purchased_at DESC
        "#;

        sqlx::query_as::<_, Course>(query)
            .bind(user_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list purchased courses: {}", e);
                DbError::QueryError(e.to_string())
            })
    }

    async fn find_for_user_and_course(
        &self,
        user_id: &str,
        course_id: Uuid,
    ) -> Result<Option<Purchase>, DbError> {
        debug!("Finding purchase of course {} by user {}", course_id, user_id);

        let query = format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE user_id = $1 AND course_id = $2"
        );

        sqlx::query_as::<_, Purchase>(&query)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find purchase: {}", e);
                DbError::QueryError(e.to_string())
            })
    }

    async fn record_purchase(&self, purchase: NewPurchase) -> Result<PurchaseRecord, DbError> {
        debug!(
            "Recording purchase of course {} by user {}",
            purchase.course_id, purchase.user_id
        );

        if self
            .find_for_user_and_course(&purchase.user_id, purchase.course_id)
            .await?
            .is_some()
        {
            info!(
                "Purchase of course {} by user {} already recorded",
                purchase.course_id, purchase.user_id
            );
            return Ok(PurchaseRecord::AlreadyRecorded);
        }

        let query = format!(
            "INSERT INTO purchases ({PURCHASE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (user_id, course_id) DO NOTHING \
             RETURNING {PURCHASE_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Purchase>(&query)
            .bind(Uuid::new_v4())
            .bind(&purchase.user_id)
            .bind(purchase.course_id)
            .bind(&purchase.stripe_payment_intent_id)
            .bind(&purchase.stripe_checkout_session_id)
            .bind(purchase.amount_cents)
            .bind(Utc::now())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert purchase: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        match inserted {
            Some(row) => {
                info!(
                    "Purchase {} recorded for user {} and course {}",
                    row.id, row.user_id, row.course_id
                );
                Ok(PurchaseRecord::Created(row))
            }
            None => {
                info!("Concurrent purchase insert absorbed by unique constraint");
                Ok(PurchaseRecord::AlreadyRecorded)
            }
        }
    }
}
