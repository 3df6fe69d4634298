use coursehub_common::{format_price, AuthUser};
use coursehub_db::{
    ContentRepository, ContentType, Course, CourseContent, CourseRepository, Progress,
    ProgressRepository, Purchase, PurchaseRepository, Repositories,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::CatalogError;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// --- Data Structures ---

/// A content item as shown to a caller. `content_url` is withheld while the
/// item is locked.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LessonView {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub content_url: Option<String>,
    pub order_index: i64,
    pub duration_seconds: i64,
    pub is_preview: bool,
    pub locked: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LessonWithProgress {
    #[serde(flatten)]
    pub lesson: LessonView,
    pub progress: Option<Progress>,
}

/// Catalog entry with the caller's ownership and progress.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: Course,
    /// `price_cents` formatted for display, e.g. `$49.00`.
    pub price_display: String,
    pub is_purchased: bool,
    pub progress_percentage: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub price_display: String,
    pub lessons: Vec<LessonView>,
    pub is_purchased: bool,
    pub progress_percentage: u8,
}

/// Everything the course player needs in one response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PlayerView {
    pub course: Course,
    pub lessons: Vec<LessonWithProgress>,
    pub current_lesson_id: Option<Uuid>,
    pub progress_percentage: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PurchaseStatus {
    pub course_id: Uuid,
    pub is_purchased: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CourseProgress {
    pub course_id: Uuid,
    pub progress_percentage: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateProgressRequest {
    #[cfg_attr(feature = "openapi", schema(example = 125))]
    pub last_position_seconds: i64,
    /// Leave out to keep the stored completion flag.
    #[serde(default)]
    pub completed: Option<bool>,
}

// --- Pure helpers ---

/// `round(completed / total * 100)`, halves rounded up. An empty course is at 0.
pub fn progress_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((completed * 200 + total) / (2 * total)) as u8
}

pub fn can_access(is_purchased: bool, item: &CourseContent) -> bool {
    is_purchased || item.is_preview
}

pub fn lesson_view(item: &CourseContent, accessible: bool) -> LessonView {
    LessonView {
        id: item.id,
        course_id: item.course_id,
        title: item.title.clone(),
        description: item.description.clone(),
        content_type: item.content_type,
        content_url: accessible.then(|| item.content_url.clone()),
        order_index: item.order_index,
        duration_seconds: item.duration_seconds,
        is_preview: item.is_preview,
        locked: !accessible,
    }
}

/// Picks the lesson to open: the requested one when it belongs to the course,
/// otherwise the first unfinished lesson, otherwise the first lesson.
pub fn select_current_lesson(
    lessons: &[LessonWithProgress],
    requested: Option<Uuid>,
) -> Option<Uuid> {
    if let Some(requested) = requested {
        if lessons.iter().any(|l| l.lesson.id == requested) {
            return Some(requested);
        }
        debug!("Requested lesson {} is not part of the course", requested);
    }

    lessons
        .iter()
        .find(|l| !l.progress.as_ref().is_some_and(|p| p.completed))
        .or_else(|| lessons.first())
        .map(|l| l.lesson.id)
}

fn validate_position(last_position_seconds: i64) -> Result<(), CatalogError> {
    if last_position_seconds < 0 {
        return Err(CatalogError::InvalidProgress(
            "last_position_seconds must not be negative".to_string(),
        ));
    }
    Ok(())
}

// --- Queries ---

/// Share of the course's content the user has completed.
///
/// Content and progress are read one after the other without a transaction.
pub async fn course_progress_percentage(
    repos: &Repositories,
    user_id: &str,
    course_id: Uuid,
) -> Result<u8, CatalogError> {
    let content = repos.content.list_for_course(course_id).await?;
    if content.is_empty() {
        return Ok(0);
    }
    let ids: HashSet<Uuid> = content.iter().map(|c| c.id).collect();
    let completed = repos
        .progress
        .list_for_course(user_id, course_id)
        .await?
        .into_iter()
        .filter(|p| p.completed && ids.contains(&p.content_id))
        .count();
    Ok(progress_percentage(completed, content.len()))
}

/// The course's content in order, each item paired with the user's progress.
pub async fn content_with_progress(
    repos: &Repositories,
    user_id: &str,
    course_id: Uuid,
) -> Result<Vec<(CourseContent, Option<Progress>)>, CatalogError> {
    let content = repos.content.list_for_course(course_id).await?;
    let mut progress: HashMap<Uuid, Progress> = repos
        .progress
        .list_for_course(user_id, course_id)
        .await?
        .into_iter()
        .map(|p| (p.content_id, p))
        .collect();

    Ok(content
        .into_iter()
        .map(|item| {
            let entry = progress.remove(&item.id);
            (item, entry)
        })
        .collect())
}

async fn summarize(
    repos: &Repositories,
    user_id: Option<&str>,
    course: Course,
    is_purchased: bool,
    currency: &str,
) -> Result<CourseSummary, CatalogError> {
    let progress_percentage = match user_id {
        Some(user_id) if is_purchased => {
            course_progress_percentage(repos, user_id, course.id).await?
        }
        _ => 0,
    };
    Ok(CourseSummary {
        price_display: format_price(course.price_cents, currency),
        course,
        is_purchased,
        progress_percentage,
    })
}

/// Published courses, newest first, annotated for the caller.
pub async fn list_course_summaries(
    repos: &Repositories,
    user: Option<&AuthUser>,
    currency: &str,
) -> Result<Vec<CourseSummary>, CatalogError> {
    let courses = repos.courses.list_published_courses().await?;

    let owned: HashSet<Uuid> = match user {
        Some(user) => repos
            .purchases
            .list_for_user(&user.user_id)
            .await?
            .into_iter()
            .map(|p| p.course_id)
            .collect(),
        None => HashSet::new(),
    };

    let user_id = user.map(|u| u.user_id.as_str());
    let mut summaries = Vec::with_capacity(courses.len());
    for course in courses {
        let is_purchased = owned.contains(&course.id);
        summaries.push(summarize(repos, user_id, course, is_purchased, currency).await?);
    }
    Ok(summaries)
}

pub async fn course_detail(
    repos: &Repositories,
    user: Option<&AuthUser>,
    slug: &str,
    currency: &str,
) -> Result<CourseDetail, CatalogError> {
    let course = repos
        .courses
        .find_published_by_slug(slug)
        .await?
        .ok_or(CatalogError::CourseNotFound)?;

    let is_purchased = match user {
        Some(user) => repos.purchases.has_purchased(&user.user_id, course.id).await?,
        None => false,
    };

    let lessons = repos
        .content
        .list_for_course(course.id)
        .await?
        .iter()
        .map(|item| lesson_view(item, can_access(is_purchased, item)))
        .collect();

    let progress_percentage = match user {
        Some(user) if is_purchased => {
            course_progress_percentage(repos, &user.user_id, course.id).await?
        }
        _ => 0,
    };

    Ok(CourseDetail {
        price_display: format_price(course.price_cents, currency),
        course,
        lessons,
        is_purchased,
        progress_percentage,
    })
}

/// Player data for an owned course.
pub async fn course_player(
    repos: &Repositories,
    user: &AuthUser,
    slug: &str,
    requested_lesson: Option<Uuid>,
) -> Result<PlayerView, CatalogError> {
    let course = repos
        .courses
        .find_published_by_slug(slug)
        .await?
        .ok_or(CatalogError::CourseNotFound)?;

    if !repos.purchases.has_purchased(&user.user_id, course.id).await? {
        info!(
            "User {} opened the player of {} without owning it",
            user.user_id, course.slug
        );
        return Err(CatalogError::NotPurchased);
    }

    let lessons: Vec<LessonWithProgress> = content_with_progress(repos, &user.user_id, course.id)
        .await?
        .into_iter()
        .map(|(item, progress)| LessonWithProgress {
            lesson: lesson_view(&item, true),
            progress,
        })
        .collect();

    let completed = lessons
        .iter()
        .filter(|l| l.progress.as_ref().is_some_and(|p| p.completed))
        .count();
    let progress_percentage = progress_percentage(completed, lessons.len());
    let current_lesson_id = select_current_lesson(&lessons, requested_lesson);

    Ok(PlayerView {
        course,
        lessons,
        current_lesson_id,
        progress_percentage,
    })
}

/// A single content item, redacted unless the caller may open it.
pub async fn lesson(
    repos: &Repositories,
    user: Option<&AuthUser>,
    content_id: Uuid,
) -> Result<LessonView, CatalogError> {
    let item = repos
        .content
        .find_by_id(content_id)
        .await?
        .ok_or(CatalogError::ContentNotFound(content_id))?;

    let is_purchased = match user {
        Some(user) => repos.purchases.has_purchased(&user.user_id, item.course_id).await?,
        None => false,
    };

    Ok(lesson_view(&item, can_access(is_purchased, &item)))
}

pub async fn my_purchases(repos: &Repositories, user: &AuthUser) -> Result<Vec<Purchase>, CatalogError> {
    Ok(repos.purchases.list_for_user(&user.user_id).await?)
}

/// Owned courses with their progress.
pub async fn my_courses(
    repos: &Repositories,
    user: &AuthUser,
    currency: &str,
) -> Result<Vec<CourseSummary>, CatalogError> {
    let courses = repos.purchases.purchased_courses(&user.user_id).await?;
    let mut summaries = Vec::with_capacity(courses.len());
    for course in courses {
        summaries.push(summarize(repos, Some(user.user_id.as_str()), course, true, currency).await?);
    }
    Ok(summaries)
}

pub async fn purchase_status(
    repos: &Repositories,
    user: &AuthUser,
    course_id: Uuid,
) -> Result<PurchaseStatus, CatalogError> {
    let is_purchased = repos.purchases.has_purchased(&user.user_id, course_id).await?;
    Ok(PurchaseStatus {
        course_id,
        is_purchased,
    })
}

pub async fn course_progress(
    repos: &Repositories,
    user: &AuthUser,
    course_id: Uuid,
) -> Result<CourseProgress, CatalogError> {
    let progress_percentage = course_progress_percentage(repos, &user.user_id, course_id).await?;
    Ok(CourseProgress {
        course_id,
        progress_percentage,
    })
}

pub async fn content_progress(
    repos: &Repositories,
    user: &AuthUser,
    content_id: Uuid,
) -> Result<Option<Progress>, CatalogError> {
    Ok(repos.progress.find(&user.user_id, content_id).await?)
}

/// Progress may only be written for content the user can open.
async fn ensure_accessible(
    repos: &Repositories,
    user: &AuthUser,
    content_id: Uuid,
) -> Result<CourseContent, CatalogError> {
    let item = repos
        .content
        .find_by_id(content_id)
        .await?
        .ok_or(CatalogError::ContentNotFound(content_id))?;

    if item.is_preview || repos.purchases.has_purchased(&user.user_id, item.course_id).await? {
        Ok(item)
    } else {
        Err(CatalogError::NotPurchased)
    }
}

pub async fn update_progress(
    repos: &Repositories,
    user: &AuthUser,
    content_id: Uuid,
    request: UpdateProgressRequest,
) -> Result<Progress, CatalogError> {
    validate_position(request.last_position_seconds)?;
    ensure_accessible(repos, user, content_id).await?;

    let progress = repos
        .progress
        .upsert_position(
            &user.user_id,
            content_id,
            request.last_position_seconds,
            request.completed,
        )
        .await?;
    debug!(
        "Progress of {} on {}: {}s, completed={}",
        user.user_id, content_id, progress.last_position_seconds, progress.completed
    );
    Ok(progress)
}

pub async fn complete_content(
    repos: &Repositories,
    user: &AuthUser,
    content_id: Uuid,
) -> Result<Progress, CatalogError> {
    ensure_accessible(repos, user, content_id).await?;
    let progress = repos.progress.mark_complete(&user.user_id, content_id).await?;
    info!("User {} completed content {}", user.user_id, content_id);
    Ok(progress)
}
