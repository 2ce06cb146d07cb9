//! Read-only listings of the resource directory.

use axum::extract::State;
use axum::Json;

use timetable_db::models::directory::{Course, Instructor, Room};
use timetable_db::repositories::{CourseRepo, InstructorRepo, RoomRepo};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/rooms
pub async fn list_rooms(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Room>>>> {
    let rooms = RoomRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(rooms)))
}

/// GET /api/v1/courses
pub async fn list_courses(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Course>>>> {
    let courses = CourseRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(courses)))
}

/// GET /api/v1/instructors
pub async fn list_instructors(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Instructor>>>> {
    let instructors = InstructorRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(instructors)))
}
