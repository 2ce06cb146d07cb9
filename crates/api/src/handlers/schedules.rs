//! Handlers for schedule assignments.
//!
//! Writes go through the shared [`ScheduleManager`](timetable_core::manager::ScheduleManager)
//! so conflict checking and write serialization apply to every path.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use timetable_core::assignment::{AssignmentFilter, AssignmentInput, ScheduleAssignment};
use timetable_core::conflict::Conflict;
use timetable_core::error::CoreError;
use timetable_core::types::EntityId;
use timetable_db::repositories::{EnrollmentRepo, StudentRepo};

use crate::error::AppResult;
use crate::handlers::path_id;
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireStaff};
use crate::query::ScheduleQuery;
use crate::response::{DataResponse, ScheduleResponse};
use crate::state::AppState;

/// Outcome of a dry-run conflict check.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCheck {
    pub has_conflicts: bool,
    pub conflicts: Vec<String>,
    pub details: Vec<Conflict>,
}

/// GET /api/v1/schedules
///
/// List assignments, optionally filtered by term and status.
pub async fn list_schedules(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ScheduleQuery>,
) -> AppResult<Json<DataResponse<Vec<ScheduleAssignment>>>> {
    let filter = params.to_filter()?;
    let schedules = state.schedules.list(&filter).await?;
    Ok(Json(DataResponse::new(schedules)))
}

/// GET /api/v1/schedules/{id}
pub async fn get_schedule(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<ScheduleAssignment>>> {
    let id = path_id("scheduleId", &id)?;
    let schedule = state.schedules.get(&id).await?;
    Ok(Json(DataResponse::new(schedule)))
}

/// POST /api/v1/schedules
///
/// Create an assignment. Conflicts other than an exact duplicate do not
/// block the write: the record is stored with `status = conflict` and the
/// messages are returned alongside it.
pub async fn create_schedule(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    payload: Result<Json<AssignmentInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let outcome = state.schedules.create(&input).await?;

    tracing::info!(
        user_id = %admin.user_id,
        schedule_id = %outcome.schedule.id,
        has_conflicts = outcome.has_conflicts(),
        "Schedule created via API"
    );

    Ok((
        StatusCode::CREATED,
        Json(ScheduleResponse::from_outcome(
            outcome,
            "Schedule created successfully",
            "Schedule created with conflicts",
        )),
    ))
}

/// PUT /api/v1/schedules/{id}
///
/// Partial update. Conflicts are re-checked only when a schedule field is
/// present in the body.
pub async fn update_schedule(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AssignmentInput>, JsonRejection>,
) -> AppResult<Json<ScheduleResponse>> {
    let id = path_id("scheduleId", &id)?;
    let Json(input) = payload?;
    let outcome = state.schedules.update(&id, &input).await?;

    tracing::info!(
        user_id = %admin.user_id,
        schedule_id = %id,
        status = outcome.schedule.status.as_str(),
        "Schedule updated via API"
    );

    Ok(Json(ScheduleResponse::from_outcome(
        outcome,
        "Schedule updated successfully",
        "Schedule updated with conflicts",
    )))
}

/// DELETE /api/v1/schedules/{id}
pub async fn delete_schedule(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ScheduleResponse>> {
    let id = path_id("scheduleId", &id)?;
    state.schedules.delete(&id).await?;

    tracing::info!(
        user_id = %admin.user_id,
        schedule_id = %id,
        "Schedule deleted via API"
    );

    Ok(Json(ScheduleResponse::message("Schedule deleted successfully")))
}

/// POST /api/v1/schedules/check
///
/// Run the full conflict check for a payload without persisting it.
pub async fn check_schedule(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    payload: Result<Json<AssignmentInput>, JsonRejection>,
) -> AppResult<Json<DataResponse<ConflictCheck>>> {
    let Json(input) = payload?;
    let report = state.schedules.preview(&input).await?;
    Ok(Json(DataResponse::new(ConflictCheck {
        has_conflicts: report.has_conflicts(),
        conflicts: report.messages(),
        details: report.conflicts,
    })))
}

/// GET /api/v1/schedules/summary
///
/// Published and conflict counts, optionally for one term.
pub async fn schedule_summary(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ScheduleQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = params.to_filter()?;
    let summary = state
        .schedules
        .status_summary(filter.semester, filter.year)
        .await?;
    Ok(Json(DataResponse::new(summary)))
}

/// GET /api/v1/instructors/{id}/schedules
pub async fn instructor_schedules(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ScheduleQuery>,
) -> AppResult<Json<DataResponse<Vec<ScheduleAssignment>>>> {
    let instructor_id = path_id("instructorId", &id)?;
    let filter = AssignmentFilter {
        instructor_id: Some(instructor_id),
        ..params.to_filter()?
    };
    let schedules = state.schedules.list(&filter).await?;
    Ok(Json(DataResponse::new(schedules)))
}

/// GET /api/v1/instructors/{id}/workload
///
/// Weekly teaching hours against the instructor's cap.
pub async fn instructor_workload(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ScheduleQuery>,
) -> AppResult<impl IntoResponse> {
    let instructor_id = path_id("instructorId", &id)?;
    let workload = state
        .schedules
        .workload(&instructor_id, params.to_filter()?)
        .await?;
    Ok(Json(DataResponse::new(workload)))
}

/// GET /api/v1/students/{id}/schedules
///
/// Assignments for every course the student is enrolled in.
pub async fn student_schedules(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<ScheduleQuery>,
) -> AppResult<Json<DataResponse<Vec<ScheduleAssignment>>>> {
    let student_id = path_id("studentId", &id)?;
    StudentRepo::find_by_id(&state.pool, student_id.as_str())
        .await?
        .ok_or_else(|| CoreError::not_found("Student", &student_id))?;

    let rows = EnrollmentRepo::course_ids_for_student(&state.pool, student_id.as_str()).await?;
    let course_ids = rows
        .iter()
        .map(|raw| EntityId::parse(raw))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CoreError::Storage(format!("enrollments row for {student_id}: {e}")))?;
    if course_ids.is_empty() {
        return Ok(Json(DataResponse::new(Vec::new())));
    }

    let filter = AssignmentFilter {
        course_ids: Some(course_ids),
        ..params.to_filter()?
    };
    let schedules = state.schedules.list(&filter).await?;
    Ok(Json(DataResponse::new(schedules)))
}
