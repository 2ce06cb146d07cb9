//! Room request rows.

use chrono::NaiveDate;
use sqlx::FromRow;
use timetable_core::error::CoreError;
use timetable_core::schedule_request::{RequestStatus, RequestType, ScheduleRequest};
use timetable_core::term::Semester;
use timetable_core::time_range::{ClockTime, DayOfWeek, TimeRange};
use timetable_core::types::{EntityId, Timestamp};

use super::corrupt_row;

/// A row from the `schedule_requests` table.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleRequestRow {
    pub id: String,
    pub instructor_id: String,
    pub course_id: Option<String>,
    pub schedule_id: Option<String>,
    pub room_id: String,
    pub request_type: String,
    pub request_date: Option<NaiveDate>,
    pub day_of_week: i16,
    pub start_time: String,
    pub end_time: String,
    pub semester: Option<String>,
    pub year: Option<i32>,
    pub purpose: String,
    pub notes: Option<String>,
    pub status: String,
    pub conflict_flag: bool,
    pub conflicts: Vec<String>,
    pub instructor_name: String,
    pub room_name: String,
    pub building: String,
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
}

impl ScheduleRequestRow {
    pub fn into_domain(self) -> Result<ScheduleRequest, CoreError> {
        let bad = |detail: String| corrupt_row("schedule_requests", &self.id, detail);
        let parse_opt = |raw: &Option<String>| -> Result<Option<EntityId>, CoreError> {
            raw.as_deref().map(EntityId::parse).transpose().map_err(bad)
        };

        let day = DayOfWeek::from_index(self.day_of_week)
            .ok_or_else(|| bad(format!("day_of_week {} out of range", self.day_of_week)))?;
        let slot = TimeRange::new(
            day,
            ClockTime::parse(&self.start_time).map_err(bad)?,
            ClockTime::parse(&self.end_time).map_err(bad)?,
        )
        .map_err(bad)?;
        let semester = self
            .semester
            .as_deref()
            .map(Semester::parse)
            .transpose()
            .map_err(bad)?;

        Ok(ScheduleRequest {
            id: EntityId::parse(&self.id).map_err(bad)?,
            instructor_id: EntityId::parse(&self.instructor_id).map_err(bad)?,
            course_id: parse_opt(&self.course_id)?,
            schedule_id: parse_opt(&self.schedule_id)?,
            room_id: EntityId::parse(&self.room_id).map_err(bad)?,
            request_type: RequestType::parse(&self.request_type).map_err(bad)?,
            date: self.request_date,
            slot,
            semester,
            year: self.year,
            purpose: self.purpose,
            notes: self.notes,
            status: RequestStatus::parse(&self.status).map_err(bad)?,
            conflict_flag: self.conflict_flag,
            conflicts: self.conflicts,
            instructor_name: self.instructor_name,
            room_name: self.room_name,
            building: self.building,
            course_code: self.course_code,
            course_name: self.course_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
            reviewed_at: self.reviewed_at,
        })
    }
}
