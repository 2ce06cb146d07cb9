//! Repository for the `schedule_requests` table.

use sqlx::{PgPool, Postgres, QueryBuilder};
use timetable_core::schedule_request::{RequestFilter, RequestStatus, ScheduleRequest};

use crate::models::schedule_request::ScheduleRequestRow;

/// Column list for schedule_requests queries.
const COLUMNS: &str = "id, instructor_id, course_id, schedule_id, room_id, request_type, \
    request_date, day_of_week, start_time, end_time, semester, year, purpose, notes, status, \
    conflict_flag, conflicts, instructor_name, room_name, building, course_code, course_name, \
    created_at, updated_at, reviewed_at";

/// Provides CRUD operations for room requests.
pub struct ScheduleRequestRepo;

impl ScheduleRequestRepo {
    pub async fn find_by_id(
        pool: &PgPool,
        id: &str,
    ) -> Result<Option<ScheduleRequestRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedule_requests WHERE id = $1");
        sqlx::query_as::<_, ScheduleRequestRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Matching requests, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &RequestFilter,
    ) -> Result<Vec<ScheduleRequestRow>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS} FROM schedule_requests WHERE TRUE"
        ));
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(id) = &filter.instructor_id {
            qb.push(" AND instructor_id = ").push_bind(id.to_string());
        }
        qb.push(" ORDER BY created_at DESC, id DESC");
        qb.build_query_as::<ScheduleRequestRow>()
            .fetch_all(pool)
            .await
    }

    /// Approved requests for a room, optionally skipping one id.
    pub async fn approved_for_room(
        pool: &PgPool,
        room_id: &str,
        exclude_id: Option<&str>,
    ) -> Result<Vec<ScheduleRequestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM schedule_requests
             WHERE room_id = $1
               AND status = $2
               AND ($3::TEXT IS NULL OR id <> $3)
             ORDER BY day_of_week ASC, start_time ASC"
        );
        sqlx::query_as::<_, ScheduleRequestRow>(&query)
            .bind(room_id)
            .bind(RequestStatus::Approved.as_str())
            .bind(exclude_id)
            .fetch_all(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        r: &ScheduleRequest,
    ) -> Result<ScheduleRequestRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO schedule_requests
                (id, instructor_id, course_id, schedule_id, room_id, request_type, request_date,
                 day_of_week, start_time, end_time, semester, year, purpose, notes, status,
                 conflict_flag, conflicts, instructor_name, room_name, building, course_code,
                 course_name, created_at, updated_at, reviewed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                     $17, $18, $19, $20, $21, $22, $23, $24, $25)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduleRequestRow>(&query)
            .bind(r.id.as_str())
            .bind(r.instructor_id.as_str())
            .bind(r.course_id.as_ref().map(|id| id.as_str()))
            .bind(r.schedule_id.as_ref().map(|id| id.as_str()))
            .bind(r.room_id.as_str())
            .bind(r.request_type.as_str())
            .bind(r.date)
            .bind(r.slot.day_of_week.index())
            .bind(r.slot.start_time.to_string())
            .bind(r.slot.end_time.to_string())
            .bind(r.semester.map(|s| s.as_str()))
            .bind(r.year)
            .bind(&r.purpose)
            .bind(&r.notes)
            .bind(r.status.as_str())
            .bind(r.conflict_flag)
            .bind(&r.conflicts)
            .bind(&r.instructor_name)
            .bind(&r.room_name)
            .bind(&r.building)
            .bind(&r.course_code)
            .bind(&r.course_name)
            .bind(r.created_at)
            .bind(r.updated_at)
            .bind(r.reviewed_at)
            .fetch_one(pool)
            .await
    }

    /// Persist the review outcome of a request. Returns `None` if it is gone.
    pub async fn update_review(
        pool: &PgPool,
        r: &ScheduleRequest,
    ) -> Result<Option<ScheduleRequestRow>, sqlx::Error> {
        let query = format!(
            "UPDATE schedule_requests SET
                status = $2,
                notes = $3,
                conflict_flag = $4,
                conflicts = $5,
                updated_at = $6,
                reviewed_at = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduleRequestRow>(&query)
            .bind(r.id.as_str())
            .bind(r.status.as_str())
            .bind(&r.notes)
            .bind(r.conflict_flag)
            .bind(&r.conflicts)
            .bind(r.updated_at)
            .bind(r.reviewed_at)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM schedule_requests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
