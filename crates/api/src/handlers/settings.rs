//! Handlers for the scheduling section of the system settings.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use timetable_core::policy::{SchedulingSettings, SettingsProvider};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Overlay the keys present in `patch` onto `current`. Unknown keys are
/// ignored by the subsequent deserialization.
fn merge_settings(
    current: &SchedulingSettings,
    patch: serde_json::Value,
) -> Result<SchedulingSettings, AppError> {
    let serde_json::Value::Object(patch) = patch else {
        return Err(AppError::BadRequest(
            "Scheduling settings must be a JSON object".into(),
        ));
    };
    let mut merged =
        serde_json::to_value(current).map_err(|e| AppError::InternalError(e.to_string()))?;
    if let serde_json::Value::Object(fields) = &mut merged {
        fields.extend(patch);
    }
    serde_json::from_value(merged)
        .map_err(|e| AppError::BadRequest(format!("Invalid scheduling settings: {e}")))
}

/// GET /api/v1/admin/settings/scheduling
pub async fn get_scheduling_settings(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SchedulingSettings>>> {
    let settings = state.schedules.backend().scheduling_settings().await?;
    Ok(Json(DataResponse::new(settings)))
}

/// PUT /api/v1/admin/settings/scheduling
///
/// Partial update: only the keys present in the body change. The next
/// conflict check picks the new policy up.
pub async fn update_scheduling_settings(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> AppResult<Json<DataResponse<SchedulingSettings>>> {
    let Json(patch) = payload?;
    let store = state.schedules.backend();
    let current = store.scheduling_settings().await?;
    let updated = merge_settings(&current, patch)?;
    updated.validate()?;

    let saved = store.save_scheduling_settings(&updated).await?;

    tracing::info!(
        user_id = %admin.user_id,
        auto_conflict_detection = saved.auto_conflict_detection,
        allow_overlapping_classes = saved.allow_overlapping_classes,
        "Scheduling settings updated"
    );

    Ok(Json(DataResponse::new(saved)))
}
