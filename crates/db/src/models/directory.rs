//! Rooms, courses, instructors, students and enrollments.

use serde::Serialize;
use sqlx::FromRow;
use timetable_core::directory::{CourseRef, InstructorRef, RoomRef};
use timetable_core::error::CoreError;
use timetable_core::types::{EntityId, Timestamp};

use super::corrupt_row;

fn parse_id(table: &str, raw: &str) -> Result<EntityId, CoreError> {
    EntityId::parse(raw).map_err(|e| corrupt_row(table, raw, e))
}

/// A row from the `rooms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub building: String,
    pub capacity: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Room {
    pub fn into_ref(self) -> Result<RoomRef, CoreError> {
        Ok(RoomRef {
            id: parse_id("rooms", &self.id)?,
            name: self.name,
            building: self.building,
        })
    }
}

/// A row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub code: String,
    pub name: String,
    pub credits: Option<i32>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Course {
    pub fn into_ref(self) -> Result<CourseRef, CoreError> {
        Ok(CourseRef {
            id: parse_id("courses", &self.id)?,
            code: self.code,
            name: self.name,
        })
    }
}

/// A row from the `instructors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub max_hours_per_week: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Instructor {
    pub fn into_ref(self) -> Result<InstructorRef, CoreError> {
        Ok(InstructorRef {
            id: parse_id("instructors", &self.id)?,
            name: self.name,
            max_hours_per_week: self.max_hours_per_week,
        })
    }
}

/// A row from the `students` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
