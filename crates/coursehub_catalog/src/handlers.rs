use axum::{
    extract::{FromRef, Path, Query, State},
    response::Json,
};
use coursehub_common::{AuthUser, AuthVerifier, CoursehubError};
use coursehub_db::{Progress, Purchase, Repositories};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::logic::{
    self, CourseDetail, CourseProgress, CourseSummary, LessonView, PlayerView, PurchaseStatus,
    UpdateProgressRequest,
};

#[cfg(feature = "openapi")]
use utoipa::{IntoParams, ToSchema};

// Shared state of the catalog routes
#[derive(Clone)]
pub struct CatalogState {
    pub repos: Repositories,
    pub auth: AuthVerifier,
    /// Currency course prices are displayed in.
    pub currency: Arc<str>,
}

impl FromRef<CatalogState> for AuthVerifier {
    fn from_ref(state: &CatalogState) -> Self {
        state.auth.clone()
    }
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(IntoParams, ToSchema))]
pub struct PlayerQuery {
    /// Lesson to open; defaults to the first unfinished one.
    pub lesson: Option<Uuid>,
}

/// List published courses, newest first.
#[axum::debug_handler(state = CatalogState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/courses", // Path relative to /api
    responses(
        (status = 200, description = "Published courses, with ownership and progress when signed in", body = Vec<CourseSummary>),
        (status = 401, description = "Invalid bearer token")
    ),
    tag = "Catalog"
))]
pub async fn list_courses_handler(
    State(state): State<CatalogState>,
    user: Option<AuthUser>,
) -> Result<Json<Vec<CourseSummary>>, CoursehubError> {
    let courses = logic::list_course_summaries(&state.repos, user.as_ref(), &state.currency).await?;
    Ok(Json(courses))
}

/// Course page: the course with its lessons, locked ones without URL.
#[axum::debug_handler(state = CatalogState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/courses/{slug}", // Path relative to /api
    params(("slug" = String, Path, description = "Course slug")),
    responses(
        (status = 200, description = "Course details", body = CourseDetail),
        (status = 404, description = "Unknown or unpublished course")
    ),
    tag = "Catalog"
))]
pub async fn course_detail_handler(
    State(state): State<CatalogState>,
    user: Option<AuthUser>,
    Path(slug): Path<String>,
) -> Result<Json<CourseDetail>, CoursehubError> {
    let detail = logic::course_detail(&state.repos, user.as_ref(), &slug, &state.currency).await?;
    Ok(Json(detail))
}

#[axum::debug_handler(state = CatalogState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/courses/{slug}/player", // Path relative to /api
    params(("slug" = String, Path, description = "Course slug"), PlayerQuery),
    responses(
        (status = 200, description = "Lessons with progress and the lesson to open", body = PlayerView),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Course not purchased"),
        (status = 404, description = "Unknown or unpublished course")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
))]
pub async fn course_player_handler(
    State(state): State<CatalogState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<PlayerView>, CoursehubError> {
    let view = logic::course_player(&state.repos, &user, &slug, query.lesson).await?;
    Ok(Json(view))
}

#[axum::debug_handler(state = CatalogState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/content/{content_id}", // Path relative to /api
    params(("content_id" = Uuid, Path, description = "Content item id")),
    responses(
        (status = 200, description = "Lesson; content_url is null while locked", body = LessonView),
        (status = 404, description = "Unknown content")
    ),
    tag = "Catalog"
))]
pub async fn lesson_handler(
    State(state): State<CatalogState>,
    user: Option<AuthUser>,
    Path(content_id): Path<Uuid>,
) -> Result<Json<LessonView>, CoursehubError> {
    let view = logic::lesson(&state.repos, user.as_ref(), content_id).await?;
    Ok(Json(view))
}

#[axum::debug_handler(state = CatalogState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/me/purchases", // Path relative to /api
    responses(
        (status = 200, description = "The caller's purchases", body = Vec<Purchase>),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_auth" = [])),
    tag = "Learner"
))]
pub async fn my_purchases_handler(
    State(state): State<CatalogState>,
    user: AuthUser,
) -> Result<Json<Vec<Purchase>>, CoursehubError> {
    Ok(Json(logic::my_purchases(&state.repos, &user).await?))
}

#[axum::debug_handler(state = CatalogState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/me/courses", // Path relative to /api
    responses(
        (status = 200, description = "Purchased courses with progress", body = Vec<CourseSummary>),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_auth" = [])),
    tag = "Learner"
))]
pub async fn my_courses_handler(
    State(state): State<CatalogState>,
    user: AuthUser,
) -> Result<Json<Vec<CourseSummary>>, CoursehubError> {
    Ok(Json(logic::my_courses(&state.repos, &user, &state.currency).await?))
}

#[axum::debug_handler(state = CatalogState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/me/courses/{course_id}/purchased", // Path relative to /api
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Whether the caller owns the course", body = PurchaseStatus),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_auth" = [])),
    tag = "Learner"
))]
pub async fn purchase_status_handler(
    State(state): State<CatalogState>,
    user: AuthUser,
    Path(course_id): Path<Uuid>,
) -> Result<Json<PurchaseStatus>, CoursehubError> {
    Ok(Json(
        logic::purchase_status(&state.repos, &user, course_id).await?,
    ))
}

#[axum::debug_handler(state = CatalogState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/me/courses/{course_id}/progress", // Path relative to /api
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Completion percentage of the course", body = CourseProgress),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_auth" = [])),
    tag = "Learner"
))]
pub async fn course_progress_handler(
    State(state): State<CatalogState>,
    user: AuthUser,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseProgress>, CoursehubError> {
    Ok(Json(
        logic::course_progress(&state.repos, &user, course_id).await?,
    ))
}

#[axum::debug_handler(state = CatalogState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/me/content/{content_id}/progress", // Path relative to /api
    params(("content_id" = Uuid, Path, description = "Content item id")),
    responses(
        (status = 200, description = "Stored progress, or null", body = Option<Progress>),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer_auth" = [])),
    tag = "Learner"
))]
pub async fn get_progress_handler(
    State(state): State<CatalogState>,
    user: AuthUser,
    Path(content_id): Path<Uuid>,
) -> Result<Json<Option<Progress>>, CoursehubError> {
    Ok(Json(
        logic::content_progress(&state.repos, &user, content_id).await?,
    ))
}

/// Save the playback position, optionally setting completion.
#[axum::debug_handler(state = CatalogState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/me/content/{content_id}/progress", // Path relative to /api
    params(("content_id" = Uuid, Path, description = "Content item id")),
    request_body = UpdateProgressRequest,
    responses(
        (status = 200, description = "Progress saved", body = Progress),
        (status = 400, description = "Negative position"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Content is locked for the caller"),
        (status = 404, description = "Unknown content")
    ),
    security(("bearer_auth" = [])),
    tag = "Learner"
))]
pub async fn update_progress_handler(
    State(state): State<CatalogState>,
    user: AuthUser,
    Path(content_id): Path<Uuid>,
    Json(payload): Json<UpdateProgressRequest>,
) -> Result<Json<Progress>, CoursehubError> {
    let progress = logic::update_progress(&state.repos, &user, content_id, payload).await?;
    Ok(Json(progress))
}

#[axum::debug_handler(state = CatalogState)]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/me/content/{content_id}/complete", // Path relative to /api
    params(("content_id" = Uuid, Path, description = "Content item id")),
    responses(
        (status = 200, description = "Content marked complete", body = Progress),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Content is locked for the caller"),
        (status = 404, description = "Unknown content")
    ),
    security(("bearer_auth" = [])),
    tag = "Learner"
))]
pub async fn complete_content_handler(
    State(state): State<CatalogState>,
    user: AuthUser,
    Path(content_id): Path<Uuid>,
) -> Result<Json<Progress>, CoursehubError> {
    let progress = logic::complete_content(&state.repos, &user, content_id).await?;
    Ok(Json(progress))
}
