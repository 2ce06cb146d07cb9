//! Keyed settings sections.

use sqlx::FromRow;
use timetable_core::types::Timestamp;

/// Key of the section holding [`timetable_core::policy::SchedulingSettings`].
pub const SCHEDULING_KEY: &str = "scheduling";

/// A row from the `system_settings` table.
#[derive(Debug, Clone, FromRow)]
pub struct SystemSetting {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: Timestamp,
}
