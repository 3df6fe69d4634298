//! Repository for courses and their content items

use crate::error::DbError;
use crate::models::{Course, CourseContent, NewContent, NewCourse};
use std::future::Future;
use uuid::Uuid;

pub trait CourseRepository {
    /// Published courses, newest first.
    fn list_published_courses(&self) -> impl Future<Output = Result<Vec<Course>, DbError>> + Send;

    /// `None` for unknown and for unpublished slugs alike.
    fn find_published_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Course>, DbError>> + Send;

    fn find_published_by_id(
        &self,
        course_id: Uuid,
    ) -> impl Future<Output = Result<Option<Course>, DbError>> + Send;

    /// Store the payment processor ids once a product and price exist for the course.
    fn set_stripe_ids(
        &self,
        course_id: Uuid,
        product_id: &str,
        price_id: &str,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    fn insert_course(&self, course: NewCourse)
        -> impl Future<Output = Result<Course, DbError>> + Send;

    fn insert_content(
        &self,
        content: NewContent,
    ) -> impl Future<Output = Result<CourseContent, DbError>> + Send;
}

pub trait ContentRepository {
    /// Content of a course ordered by `order_index` ascending.
    fn list_for_course(
        &self,
        course_id: Uuid,
    ) -> impl Future<Output = Result<Vec<CourseContent>, DbError>> + Send;

    fn find_by_id(
        &self,
        content_id: Uuid,
    ) -> impl Future<Output = Result<Option<CourseContent>, DbError>> + Send;
}
