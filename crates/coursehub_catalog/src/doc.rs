#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::PlayerQuery;
use crate::logic::{
    CourseDetail, CourseProgress, CourseSummary, LessonView, LessonWithProgress, PlayerView,
    PurchaseStatus, UpdateProgressRequest,
};
use coursehub_db::{ContentType, Course, Progress, Purchase};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::list_courses_handler,
        crate::handlers::course_detail_handler,
        crate::handlers::course_player_handler,
        crate::handlers::lesson_handler,
        crate::handlers::my_purchases_handler,
        crate::handlers::my_courses_handler,
        crate::handlers::purchase_status_handler,
        crate::handlers::course_progress_handler,
        crate::handlers::get_progress_handler,
        crate::handlers::update_progress_handler,
        crate::handlers::complete_content_handler,
    ),
    components(
        schemas(
            Course, ContentType, Purchase, Progress,
            CourseSummary, CourseDetail, LessonView, LessonWithProgress, PlayerView,
            PurchaseStatus, CourseProgress, UpdateProgressRequest, PlayerQuery
        )
    ),
    tags(
        (name = "Catalog", description = "Published courses and their lessons"),
        (name = "Learner", description = "Purchases and progress of the signed-in user")
    )
)]
pub struct CatalogApiDoc;
