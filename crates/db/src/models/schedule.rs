//! Schedule assignment rows.

use sqlx::FromRow;
use timetable_core::assignment::{AssignmentStatus, ScheduleAssignment};
use timetable_core::error::CoreError;
use timetable_core::term::{academic_year_label, Semester};
use timetable_core::time_range::{ClockTime, DayOfWeek, TimeRange};
use timetable_core::types::{EntityId, Timestamp};

use super::corrupt_row;

/// A row from the `schedules` table.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleRow {
    pub id: String,
    pub course_id: String,
    pub instructor_id: String,
    pub room_id: String,
    pub day_of_week: i16,
    pub start_time: String,
    pub end_time: String,
    pub semester: String,
    pub year: i32,
    pub status: String,
    pub conflicts: Vec<String>,
    pub course_code: String,
    pub course_name: String,
    pub instructor_name: String,
    pub room_name: String,
    pub building: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ScheduleRow {
    pub fn into_domain(self) -> Result<ScheduleAssignment, CoreError> {
        let bad = |detail: String| corrupt_row("schedules", &self.id, detail);

        let day = DayOfWeek::from_index(self.day_of_week)
            .ok_or_else(|| bad(format!("day_of_week {} out of range", self.day_of_week)))?;
        let start = ClockTime::parse(&self.start_time).map_err(bad)?;
        let end = ClockTime::parse(&self.end_time).map_err(bad)?;
        let slot = TimeRange::new(day, start, end).map_err(bad)?;
        let semester = Semester::parse(&self.semester).map_err(bad)?;
        let status = AssignmentStatus::parse(&self.status).map_err(bad)?;
        let id = EntityId::parse(&self.id).map_err(bad)?;
        let course_id = EntityId::parse(&self.course_id).map_err(bad)?;
        let instructor_id = EntityId::parse(&self.instructor_id).map_err(bad)?;
        let room_id = EntityId::parse(&self.room_id).map_err(bad)?;

        Ok(ScheduleAssignment {
            id,
            course_id,
            instructor_id,
            room_id,
            slot,
            semester,
            year: self.year,
            academic_year: academic_year_label(self.year),
            status,
            conflicts: self.conflicts,
            course_code: self.course_code,
            course_name: self.course_name,
            instructor_name: self.instructor_name,
            room_name: self.room_name,
            building: self.building,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
