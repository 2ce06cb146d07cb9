use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use timetable_core::policy::SettingsProvider;

use crate::state::AppState;

/// Conflict-detection switches currently in force.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictPolicyStatus {
    pub auto_conflict_detection: bool,
    pub allow_overlapping_classes: bool,
}

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when both the database and the settings document are readable.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub db_healthy: bool,
    /// Omitted when the settings document cannot be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_policy: Option<ConflictPolicyStatus>,
}

/// GET /health -- database reachability plus the policy the conflict
/// engine would apply to the next write.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = timetable_db::health_check(&state.pool).await.is_ok();

    let conflict_policy = if db_healthy {
        match state.schedules.backend().scheduling_settings().await {
            Ok(settings) => Some(ConflictPolicyStatus {
                auto_conflict_detection: settings.auto_conflict_detection,
                allow_overlapping_classes: settings.allow_overlapping_classes,
            }),
            Err(err) => {
                tracing::warn!(error = %err, "Scheduling settings unreadable during health check");
                None
            }
        }
    } else {
        None
    };

    let status = if conflict_policy.is_some() { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        conflict_policy,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
