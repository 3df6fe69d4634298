//! SQL implementation of the progress repository

use crate::error::DbError;
use crate::models::Progress;
use crate::repositories::progress::ProgressRepository;
use crate::DbClient;
use chrono::Utc;
use tracing::{debug, error};
use uuid::Uuid;

const PROGRESS_COLUMNS: &str =
    "id, user_id, content_id, completed, last_position_seconds, updated_at";

#[derive(Debug, Clone)]
pub struct SqlProgressRepository {
    db_client: DbClient,
}

impl SqlProgressRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

impl ProgressRepository for SqlProgressRepository {
    async fn find(&self, user_id: &str, content_id: Uuid) -> Result<Option<Progress>, DbError> {
        debug!("Finding progress of user {} on content {}", user_id, content_id);

        let query = format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress WHERE user_id = $1 AND content_id = $2"
        );

        sqlx::query_as::<_, Progress>(&query)
            .bind(user_id)
            .bind(content_id)
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find progress: {}", e);
                DbError::QueryError(e.to_string())
            })
    }

    async fn list_for_course(
        &self,
        user_id: &str,
        course_id: Uuid,
    ) -> Result<Vec<Progress>, DbError> {
        debug!("Listing progress of user {} in course {}", user_id, course_id);

        let query = r#"
            SELECT p.id, p.user_id, p.content_id, p.completed, p.last_position_seconds, p.updated_at
            FROM progress p
            INNER JOIN course_content c ON c.id = p.content_id
            WHERE p.user_id = $1 AND c.course_id = $2
            ORDER BY c.order_index ASC
        "#;

        sqlx::query_as::<_, Progress>(query)
            .bind(user_id)
            .bind(course_id)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to list course progress: {}", e);
                DbError::QueryError(e.to_string())
            })
    }

    async fn upsert_position(
        &self,
        user_id: &str,
        content_id: Uuid,
        last_position_seconds: i64,
        completed: Option<bool>,
    ) -> Result<Progress, DbError> {
        debug!(
            "Saving position {}s of user {} on content {}",
            last_position_seconds, user_id, content_id
        );

        // $4 is NULL when the caller did not say anything about completion.
        let query = format!(
            "INSERT INTO progress ({PROGRESS_COLUMNS}) \
             VALUES ($1, $2, $3, COALESCE($4, 0), $5, $6) \
             ON CONFLICT (user_id, content_id) DO UPDATE SET \
                 completed = COALESCE($4, progress.completed), \
                 last_position_seconds = excluded.last_position_seconds, \
                 updated_at = excluded.updated_at \
             RETURNING {PROGRESS_COLUMNS}"
        );

        sqlx::query_as::<_, Progress>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(content_id)
            .bind(completed)
            .bind(last_position_seconds)
            .bind(Utc::now())
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to upsert progress: {}", e);
                DbError::QueryError(e.to_string())
            })
    }

    async fn mark_complete(&self, user_id: &str, content_id: Uuid) -> Result<Progress, DbError> {
        debug!("Marking content {} complete for user {}", content_id, user_id);

        let query = format!(
            "INSERT INTO progress ({PROGRESS_COLUMNS}) \
             VALUES ($1, $2, $3, 1, 0, $4) \
             ON CONFLICT (user_id, content_id) DO UPDATE SET \
                 completed = 1, \
                 updated_at = excluded.updated_at \
             RETURNING {PROGRESS_COLUMNS}"
        );

        sqlx::query_as::<_, Progress>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(content_id)
            .bind(Utc::now())
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to mark content complete: {}", e);
                DbError::QueryError(e.to_string())
            })
    }
}
