//! Read-only view of courses, instructors and rooms.
//!
//! The engine resolves every referenced id through [`ResourceDirectory`] and
//! copies the display fields onto the record it writes. Those copies are a
//! write-time snapshot: renaming a course later does not touch assignments
//! that already exist.

use std::future::Future;

use serde::Serialize;

use crate::error::CoreError;
use crate::types::EntityId;

/// Fallback shown when an instructor record carries no display name.
pub const UNKNOWN_INSTRUCTOR: &str = "Unknown Instructor";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    pub id: EntityId,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorRef {
    pub id: EntityId,
    pub name: Option<String>,
    pub max_hours_per_week: Option<i32>,
}

impl InstructorRef {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(UNKNOWN_INSTRUCTOR)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    pub id: EntityId,
    pub name: String,
    pub building: String,
}

/// Lookup seam onto the course/instructor/room collections.
///
/// `Ok(None)` means the entity does not exist; `Err` means the lookup
/// itself failed.
pub trait ResourceDirectory: Send + Sync {
    fn find_course(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Option<CourseRef>, CoreError>> + Send;

    fn find_instructor(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Option<InstructorRef>, CoreError>> + Send;

    fn find_room(
        &self,
        id: &EntityId,
    ) -> impl Future<Output = Result<Option<RoomRef>, CoreError>> + Send;
}

/// Resolve a course or fail with [`CoreError::NotFound`].
pub async fn require_course<D: ResourceDirectory>(
    directory: &D,
    id: &EntityId,
) -> Result<CourseRef, CoreError> {
    directory
        .find_course(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Course", id))
}

/// Resolve an instructor or fail with [`CoreError::NotFound`].
pub async fn require_instructor<D: ResourceDirectory>(
    directory: &D,
    id: &EntityId,
) -> Result<InstructorRef, CoreError> {
    directory
        .find_instructor(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Instructor", id))
}

/// Resolve a room or fail with [`CoreError::NotFound`].
pub async fn require_room<D: ResourceDirectory>(
    directory: &D,
    id: &EntityId,
) -> Result<RoomRef, CoreError> {
    directory
        .find_room(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Room", id))
}
