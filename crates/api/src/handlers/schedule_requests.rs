//! Handlers for room-booking requests.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use timetable_core::schedule_request::{
    RequestFilter, RequestInput, ScheduleRequest, StatusUpdate,
};

use crate::error::AppResult;
use crate::handlers::path_id;
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireStaff};
use crate::query::RequestQuery;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/schedule-requests
///
/// File a request. It starts `pending`, flagged if it collides with an
/// already approved request for the same room.
pub async fn create_request(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    payload: Result<Json<RequestInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let request = state.requests.create(&input).await?;

    tracing::info!(
        user_id = %user.user_id,
        request_id = %request.id,
        conflict_flag = request.conflict_flag,
        "Schedule request filed via API"
    );

    Ok((StatusCode::CREATED, Json(DataResponse::new(request))))
}

/// GET /api/v1/schedule-requests
///
/// All requests, newest first, optionally filtered by `?status=`.
pub async fn list_requests(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<RequestQuery>,
) -> AppResult<Json<DataResponse<Vec<ScheduleRequest>>>> {
    let filter = params.to_filter()?;
    let requests = state.requests.list(&filter).await?;
    Ok(Json(DataResponse::new(requests)))
}

/// GET /api/v1/schedule-requests/{id}
pub async fn get_request(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<ScheduleRequest>>> {
    let id = path_id("requestId", &id)?;
    let request = state.requests.get(&id).await?;
    Ok(Json(DataResponse::new(request)))
}

/// GET /api/v1/instructors/{id}/schedule-requests
pub async fn instructor_requests(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<RequestQuery>,
) -> AppResult<Json<DataResponse<Vec<ScheduleRequest>>>> {
    let instructor_id = path_id("instructorId", &id)?;
    let filter = RequestFilter {
        instructor_id: Some(instructor_id),
        ..params.to_filter()?
    };
    let requests = state.requests.list(&filter).await?;
    Ok(Json(DataResponse::new(requests)))
}

/// PUT /api/v1/schedule-requests/{id}/status
///
/// Review a request. Approval recomputes the conflict flag.
pub async fn update_request_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> AppResult<Json<DataResponse<ScheduleRequest>>> {
    let id = path_id("requestId", &id)?;
    let Json(update) = payload?;
    let request = state.requests.update_status(&id, &update).await?;

    tracing::info!(
        user_id = %admin.user_id,
        request_id = %id,
        status = request.status.as_str(),
        "Schedule request reviewed via API"
    );

    Ok(Json(DataResponse::new(request)))
}

/// DELETE /api/v1/schedule-requests/{id}
pub async fn delete_request(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = path_id("requestId", &id)?;
    state.requests.delete(&id).await?;

    tracing::info!(user_id = %user.user_id, request_id = %id, "Schedule request deleted via API");

    Ok(StatusCode::NO_CONTENT)
}
