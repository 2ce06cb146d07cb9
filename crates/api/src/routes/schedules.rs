//! Route definitions for schedule assignments.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::schedules;
use crate::state::AppState;

/// Mounted at `/schedules`.
///
/// ```text
/// GET    /                list_schedules
/// POST   /                create_schedule
/// POST   /check           check_schedule
/// GET    /summary         schedule_summary
/// GET    /{id}            get_schedule
/// PUT    /{id}            update_schedule
/// DELETE /{id}            delete_schedule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(schedules::list_schedules).post(schedules::create_schedule),
        )
        .route("/check", post(schedules::check_schedule))
        .route("/summary", get(schedules::schedule_summary))
        .route(
            "/{id}",
            get(schedules::get_schedule)
                .put(schedules::update_schedule)
                .delete(schedules::delete_schedule),
        )
}

/// Instructor-scoped schedule routes, merged into `/instructors`.
///
/// ```text
/// GET    /{id}/schedules  instructor_schedules
/// GET    /{id}/workload   instructor_workload
/// ```
pub fn instructor_router() -> Router<AppState> {
    Router::new()
        .route("/{id}/schedules", get(schedules::instructor_schedules))
        .route("/{id}/workload", get(schedules::instructor_workload))
}

/// Mounted at `/students`.
///
/// ```text
/// GET    /{id}/schedules  student_schedules
/// ```
pub fn student_router() -> Router<AppState> {
    Router::new().route("/{id}/schedules", get(schedules::student_schedules))
}
