//! Timetable scheduling engine.
//!
//! Pure domain logic with no database dependency. Persistence, directory
//! lookups and settings are reached through the traits in [`assignment`],
//! [`schedule_request`], [`directory`] and [`policy`]; the `timetable-db`
//! crate implements them over PostgreSQL.
//!
//! - [`conflict::detect_conflicts`]: the pure detector.
//! - [`manager::ScheduleManager`]: create/update/delete of assignments.
//! - [`schedule_request::RequestWorkflow`]: the room request funnel.

pub mod assignment;
pub mod conflict;
pub mod directory;
pub mod error;
pub mod locks;
pub mod manager;
pub mod policy;
pub mod roles;
pub mod schedule_request;
pub mod term;
pub mod time_range;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;
