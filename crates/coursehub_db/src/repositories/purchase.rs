//! Repository for purchases
//!
//! A purchase grants a user lifetime access to one course. At most one row
//! exists per `(user_id, course_id)`; recording is therefore idempotent and
//! safe to call for every redelivery of a payment notification.

use crate::error::DbError;
use crate::models::{Course, NewPurchase, Purchase, PurchaseRecord};
use std::future::Future;
use uuid::Uuid;

pub trait PurchaseRepository {
    fn list_for_user(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Purchase>, DbError>> + Send;

    fn has_purchased(
        &self,
        user_id: &str,
        course_id: Uuid,
    ) -> impl Future<Output = Result<bool, DbError>> + Send;

    /// Courses the user owns. Purchases whose course no longer exists are skipped.
    fn purchased_courses(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<Course>, DbError>> + Send;

    fn find_for_user_and_course(
        &self,
        user_id: &str,
        course_id: Uuid,
    ) -> impl Future<Output = Result<Option<Purchase>, DbError>> + Send;

    /// Check-then-insert keyed on `(user_id, course_id)`. A concurrent duplicate
    /// that slips past the check is absorbed by the unique constraint and also
    /// reported as [`PurchaseRecord::AlreadyRecorded`].
    fn record_purchase(
        &self,
        purchase: NewPurchase,
    ) -> impl Future<Output = Result<PurchaseRecord, DbError>> + Send;
}
