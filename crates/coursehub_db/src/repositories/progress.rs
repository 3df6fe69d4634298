//! Repository for per-user progress on content items

use crate::error::DbError;
use crate::models::Progress;
use std::future::Future;
use uuid::Uuid;

pub trait ProgressRepository {
    fn find(
        &self,
        user_id: &str,
        content_id: Uuid,
    ) -> impl Future<Output = Result<Option<Progress>, DbError>> + Send;

    /// Progress rows of the user for content belonging to the course.
    fn list_for_course(
        &self,
        user_id: &str,
        course_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Progress>, DbError>> + Send;

    /// Upsert keyed on `(user_id, content_id)`.
    ///
    /// `completed: None` leaves the stored flag as it is (new rows start
    /// incomplete); `Some(flag)` overwrites it.
    fn upsert_position(
        &self,
        user_id: &str,
        content_id: Uuid,
        last_position_seconds: i64,
        completed: Option<bool>,
    ) -> impl Future<Output = Result<Progress, DbError>> + Send;

    /// Sets `completed`, keeping any stored position (new rows start at 0).
    fn mark_complete(
        &self,
        user_id: &str,
        content_id: Uuid,
    ) -> impl Future<Output = Result<Progress, DbError>> + Send;
}
