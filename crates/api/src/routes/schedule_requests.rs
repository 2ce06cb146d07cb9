//! Route definitions for room-booking requests.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::schedule_requests;
use crate::state::AppState;

/// Mounted at `/schedule-requests`.
///
/// ```text
/// GET    /                list_requests
/// POST   /                create_request
/// GET    /{id}            get_request
/// DELETE /{id}            delete_request
/// PUT    /{id}/status     update_request_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(schedule_requests::list_requests).post(schedule_requests::create_request),
        )
        .route(
            "/{id}",
            get(schedule_requests::get_request).delete(schedule_requests::delete_request),
        )
        .route("/{id}/status", put(schedule_requests::update_request_status))
}

/// Merged into `/instructors`.
///
/// ```text
/// GET    /{id}/schedule-requests   instructor_requests
/// ```
pub fn instructor_router() -> Router<AppState> {
    Router::new().route(
        "/{id}/schedule-requests",
        get(schedule_requests::instructor_requests),
    )
}
