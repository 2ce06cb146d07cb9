pub mod directory;
pub mod health;
pub mod schedule_requests;
pub mod schedules;
pub mod settings;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /schedules                                       list, create
/// /schedules/check                                 dry-run conflict check (POST)
/// /schedules/summary                               published/conflict counts
/// /schedules/{id}                                  get, update, delete
///
/// /schedule-requests                               list (admin), create
/// /schedule-requests/{id}                          get, delete
/// /schedule-requests/{id}/status                   review (PUT, admin)
///
/// /instructors                                     list
/// /instructors/{id}/schedules                      instructor timetable
/// /instructors/{id}/workload                       weekly hours
/// /instructors/{id}/schedule-requests              requests filed by instructor
///
/// /students/{id}/schedules                         timetable from enrollments
///
/// /rooms                                           list
/// /courses                                         list
///
/// /admin/settings/scheduling                       get, update (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/schedules", schedules::router())
        .nest("/schedule-requests", schedule_requests::router())
        .nest(
            "/instructors",
            directory::instructor_router()
                .merge(schedules::instructor_router())
                .merge(schedule_requests::instructor_router()),
        )
        .nest("/students", schedules::student_router())
        .nest("/rooms", directory::room_router())
        .nest("/courses", directory::course_router())
        .nest("/admin/settings", settings::router())
}
