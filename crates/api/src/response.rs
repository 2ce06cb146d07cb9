//! Shared response envelope types for API handlers.
//!
//! Reads answer with `{ "success": true, "data": ... }`. Schedule mutations
//! answer with [`ScheduleResponse`], which also carries the conflict list.

use serde::Serialize;
use timetable_core::assignment::ScheduleAssignment;
use timetable_core::manager::ScheduleOutcome;

/// Standard `{ "success": true, "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse::new(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Result of a schedule create, update or delete.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub success: bool,
    pub message: String,
    pub conflicts: Vec<String>,
    pub has_conflicts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleAssignment>,
}

impl ScheduleResponse {
    /// Build from an engine outcome, picking the message by whether any
    /// conflict was found.
    pub fn from_outcome(outcome: ScheduleOutcome, clean: &str, flagged: &str) -> Self {
        let has_conflicts = outcome.has_conflicts();
        Self {
            success: true,
            message: if has_conflicts { flagged } else { clean }.to_string(),
            conflicts: outcome.conflicts,
            has_conflicts,
            schedule: Some(outcome.schedule),
        }
    }

    /// A mutation with nothing to report beyond success.
    pub fn message(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            conflicts: Vec::new(),
            has_conflicts: false,
            schedule: None,
        }
    }
}
