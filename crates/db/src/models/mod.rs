//! Row structs for every table, plus conversions into engine types.
//!
//! Rows hold database-shaped values (text ids, `SMALLINT` days, `HH:MM`
//! text). `into_domain` re-validates them on the way out so a corrupt row
//! surfaces as a storage error instead of a panic.

pub mod directory;
pub mod schedule;
pub mod schedule_request;
pub mod setting;

use timetable_core::error::CoreError;

/// Storage error for a row that no longer satisfies the domain rules.
pub(crate) fn corrupt_row(table: &str, id: &str, detail: impl std::fmt::Display) -> CoreError {
    CoreError::Storage(format!("Corrupt {table} row {id}: {detail}"))
}
