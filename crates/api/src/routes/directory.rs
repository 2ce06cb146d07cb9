//! Read-only directory routes.

use axum::routing::get;
use axum::Router;

use crate::handlers::directory;
use crate::state::AppState;

/// Mounted at `/rooms`.
pub fn room_router() -> Router<AppState> {
    Router::new().route("/", get(directory::list_rooms))
}

/// Mounted at `/courses`.
pub fn course_router() -> Router<AppState> {
    Router::new().route("/", get(directory::list_courses))
}

/// Base of `/instructors`; the schedule and request routers merge into it.
pub fn instructor_router() -> Router<AppState> {
    Router::new().route("/", get(directory::list_instructors))
}
