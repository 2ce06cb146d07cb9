pub mod directory;
pub mod schedule_requests;
pub mod schedules;
pub mod settings;

use timetable_core::error::CoreError;
use timetable_core::types::EntityId;

/// Parse a path segment as an id, naming the parameter on failure (400).
pub(crate) fn path_id(field: &str, raw: &str) -> Result<EntityId, CoreError> {
    EntityId::parse_field(field, raw)
}
