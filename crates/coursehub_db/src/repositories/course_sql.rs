//! SQL implementation of the course and content repositories

use crate::error::DbError;
use crate::models::{Course, CourseContent, NewContent, NewCourse};
use crate::repositories::course::{ContentRepository, CourseRepository};
use crate::DbClient;
use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

const COURSE_COLUMNS: &str = "id, title, slug, description, price_cents, stripe_product_id, \
     stripe_price_id, thumbnail_url, published, created_at, updated_at";

const CONTENT_COLUMNS: &str = "id, course_id, title, description, content_type, content_url, \
     order_index, duration_seconds, is_preview, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct SqlCourseRepository {
    db_client: DbClient,
}

impl SqlCourseRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl CourseRepository for SqlCourseRepository {
    async fn list_published_courses(&self) -> Result<Vec<Course>, DbError> {
        debug!("Listing published courses");

        let query = format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE published = 1 ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, Course>(&query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list courses: {}", e);
                DbError::QueryError(e.to_string())
            })
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Course>, DbError> {
        debug!("Finding published course by slug: {}", slug);

        let query =
            format!("SELECT {COURSE_COLUMNS} FROM courses WHERE slug = $1 AND published = 1");

        sqlx::query_as::<_, Course>(&query)
            .bind(slug)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find course by slug: {}", e);
                DbError::QueryError(e.to_string())
            })
    }

    async fn find_published_by_id(&self, course_id: Uuid) -> Result<Option<Course>, DbError> {
        debug!("Finding published course by id: {}", course_id);

        let query = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1 AND published = 1");

        sqlx::query_as::<_, Course>(&query)
            .bind(course_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find course by id: {}", e);
                DbError::QueryError(e.to_string())
            })
    }

    async fn set_stripe_ids(
        &self,
        course_id: Uuid,
        product_id: &str,
        price_id: &str,
    ) -> Result<(), DbError> {
        debug!("Storing Stripe ids for course: {}", course_id);

        let result = sqlx::query(
            "UPDATE courses SET stripe_product_id = $1, stripe_price_id = $2, updated_at = $3 \
             WHERE id = $4",
        )
        .bind(product_id)
        .bind(price_id)
        .bind(Utc::now())
        .bind(course_id)
        .execute(self.db_client.pool())
        .await
        .map_err(|e| {
            error!("Failed to store Stripe ids: {}", e);
            DbError::QueryError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("course {}", course_id)));
        }
        Ok(())
    }

    async fn insert_course(&self, course: NewCourse) -> Result<Course, DbError> {
        debug!("Inserting course: {}", course.slug);

        let now = Utc::now();
        let query = format!(
            "INSERT INTO courses ({COURSE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, NULL, NULL, $6, $7, $8, $8) \
             RETURNING {COURSE_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Course>(&query)
            .bind(Uuid::new_v4())
            .bind(&course.title)
            .bind(&course.slug)
            .bind(&course.description)
            .bind(course.price_cents)
            .bind(&course.thumbnail_url)
            .bind(course.published)
            .bind(now)
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert course: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        info!("Course {} created", inserted.slug);
        Ok(inserted)
    }

    async fn insert_content(&self, content: NewContent) -> Result<CourseContent, DbError> {
        debug!("Inserting content '{}' into course {}", content.title, content.course_id);

        let now = Utc::now();
        let query = format!(
            "INSERT INTO course_content ({CONTENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10) \
             RETURNING {CONTENT_COLUMNS}"
        );

        sqlx::query_as::<_, CourseContent>(&query)
            .bind(Uuid::new_v4())
            .bind(content.course_id)
            .bind(&content.title)
            .bind(&content.description)
            .bind(content.content_type)
            .bind(&content.content_url)
            .bind(content.order_index)
            .bind(content.duration_seconds)
            .bind(content.is_preview)
            .bind(now)
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert content: {}", e);
                DbError::QueryError(e.to_string())
            })
    }
}

#[derive(Debug, Clone)]
pub struct SqlContentRepository {
    db_client: DbClient,
}

impl SqlContentRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl ContentRepository for SqlContentRepository {
    async fn list_for_course(&self, course_id: Uuid) -> Result<Vec<CourseContent>, DbError> {
        debug!("Listing content for course: {}", course_id);

        let query = format!(
            "SELECT {CONTENT_COLUMNS} FROM course_content WHERE course_id = $1 \
             ORDER BY order_index ASC"
        );

        sqlx::query_as::<_, CourseContent>(&query)
            .bind(course_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list course content: {}", e);
                DbError::QueryError(e.to_string())
            })
    }

    async fn find_by_id(&self, content_id: Uuid) -> Result<Option<CourseContent>, DbError> {
        debug!("Finding content by id: {}", content_id);

        let query = format!("SELECT {CONTENT_COLUMNS} FROM course_content WHERE id = $1");

        sqlx::query_as::<_, CourseContent>(&query)
            .bind(content_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find content: {}", e);
                DbError::QueryError(e.to_string())
            })
    }
}
