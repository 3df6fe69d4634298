use crate::handlers::{
    complete_content_handler, course_detail_handler, course_player_handler,
    course_progress_handler, get_progress_handler, lesson_handler, list_courses_handler,
    my_courses_handler, my_purchases_handler, purchase_status_handler, update_progress_handler,
    CatalogState,
};
use axum::{
    routing::{get, post},
    Router,
};
use coursehub_common::AuthVerifier;
use coursehub_db::Repositories;
use std::sync::Arc;

/// Creates a router containing the catalog and learner routes. Prices are
/// displayed in `currency`.
pub fn routes(repos: Repositories, auth: AuthVerifier, currency: &str) -> Router {
    let state = CatalogState {
        repos,
        auth,
        currency: Arc::from(currency),
    };

    Router::new()
        // Public catalog, personalised when a token is sent
        .route("/courses", get(list_courses_handler))
        .route("/courses/{slug}", get(course_detail_handler))
        .route("/courses/{slug}/player", get(course_player_handler))
        .route("/content/{content_id}", get(lesson_handler))
        // Signed-in learner
        .route("/me/purchases", get(my_purchases_handler))
        .route("/me/courses", get(my_courses_handler))
        .route(
            "/me/courses/{course_id}/purchased",
            get(purchase_status_handler),
        )
        .route(
            "/me/courses/{course_id}/progress",
            get(course_progress_handler),
        )
        .route(
            "/me/content/{content_id}/progress",
            get(get_progress_handler).put(update_progress_handler),
        )
        .route(
            "/me/content/{content_id}/complete",
            post(complete_content_handler),
        )
        .with_state(state)
}
