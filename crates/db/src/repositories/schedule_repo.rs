//! Repository for the `schedules` table.

use sqlx::{PgPool, Postgres, QueryBuilder};
use timetable_core::assignment::{AssignmentFilter, ScheduleAssignment};

use crate::models::schedule::ScheduleRow;

/// Column list for schedules queries.
const COLUMNS: &str = "id, course_id, instructor_id, room_id, day_of_week, start_time, \
    end_time, semester, year, status, conflicts, course_code, course_name, instructor_name, \
    room_name, building, created_at, updated_at";

/// Append `WHERE` clauses for every set field of `filter`.
///
/// Overlap is half-open: `start_time < other.end AND end_time > other.start`
/// on the same day. Times are `HH:MM` under the C collation.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &AssignmentFilter) {
    qb.push(" WHERE TRUE");
    if let Some(id) = &filter.room_id {
        qb.push(" AND room_id = ").push_bind(id.to_string());
    }
    if let Some(id) = &filter.instructor_id {
        qb.push(" AND instructor_id = ").push_bind(id.to_string());
    }
    if let Some(id) = &filter.course_id {
        qb.push(" AND course_id = ").push_bind(id.to_string());
    }
    if let Some(ids) = &filter.course_ids {
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        qb.push(" AND course_id = ANY(").push_bind(ids).push(")");
    }
    if let Some(day) = filter.day_of_week {
        qb.push(" AND day_of_week = ").push_bind(day.index());
    }
    if let Some(range) = &filter.overlapping {
        qb.push(" AND day_of_week = ")
            .push_bind(range.day_of_week.index())
            .push(" AND start_time < ")
            .push_bind(range.end_time.to_string())
            .push(" AND end_time > ")
            .push_bind(range.start_time.to_string());
    }
    if let Some(semester) = filter.semester {
        qb.push(" AND semester = ").push_bind(semester.as_str());
    }
    if let Some(year) = filter.year {
        qb.push(" AND year = ").push_bind(year);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(id) = &filter.exclude_id {
        qb.push(" AND id <> ").push_bind(id.to_string());
    }
}

/// Provides CRUD operations for schedule assignments.
pub struct ScheduleRepo;

impl ScheduleRepo {
    /// Matching rows ordered by day, then start time.
    pub async fn find(
        pool: &PgPool,
        filter: &AssignmentFilter,
    ) -> Result<Vec<ScheduleRow>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM schedules"));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY day_of_week ASC, start_time ASC, id ASC");
        qb.build_query_as::<ScheduleRow>().fetch_all(pool).await
    }

    pub async fn count(pool: &PgPool, filter: &AssignmentFilter) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM schedules");
        push_filter(&mut qb, filter);
        qb.build_query_scalar::<i64>().fetch_one(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<ScheduleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM schedules WHERE id = $1");
        sqlx::query_as::<_, ScheduleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a fully built assignment, returning the stored row.
    pub async fn create(pool: &PgPool, a: &ScheduleAssignment) -> Result<ScheduleRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO schedules
                (id, course_id, instructor_id, room_id, day_of_week, start_time, end_time,
                 semester, year, status, conflicts, course_code, course_name, instructor_name,
                 room_name, building, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                     $17, $18)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduleRow>(&query)
            .bind(a.id.as_str())
            .bind(a.course_id.as_str())
            .bind(a.instructor_id.as_str())
            .bind(a.room_id.as_str())
            .bind(a.slot.day_of_week.index())
            .bind(a.slot.start_time.to_string())
            .bind(a.slot.end_time.to_string())
            .bind(a.semester.as_str())
            .bind(a.year)
            .bind(a.status.as_str())
            .bind(&a.conflicts)
            .bind(&a.course_code)
            .bind(&a.course_name)
            .bind(&a.instructor_name)
            .bind(&a.room_name)
            .bind(&a.building)
            .bind(a.created_at)
            .bind(a.updated_at)
            .fetch_one(pool)
            .await
    }

    /// Overwrite every mutable column. Returns `None` if the row is gone.
    pub async fn update(
        pool: &PgPool,
        a: &ScheduleAssignment,
    ) -> Result<Option<ScheduleRow>, sqlx::Error> {
        let query = format!(
            "UPDATE schedules SET
                course_id = $2,
                instructor_id = $3,
                room_id = $4,
                day_of_week = $5,
                start_time = $6,
                end_time = $7,
                semester = $8,
                year = $9,
                status = $10,
                conflicts = $11,
                course_code = $12,
                course_name = $13,
                instructor_name = $14,
                room_name = $15,
                building = $16,
                updated_at = $17
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduleRow>(&query)
            .bind(a.id.as_str())
            .bind(a.course_id.as_str())
            .bind(a.instructor_id.as_str())
            .bind(a.room_id.as_str())
            .bind(a.slot.day_of_week.index())
            .bind(a.slot.start_time.to_string())
            .bind(a.slot.end_time.to_string())
            .bind(a.semester.as_str())
            .bind(a.year)
            .bind(a.status.as_str())
            .bind(&a.conflicts)
            .bind(&a.course_code)
            .bind(&a.course_name)
            .bind(&a.instructor_name)
            .bind(&a.room_name)
            .bind(&a.building)
            .bind(a.updated_at)
            .fetch_optional(pool)
            .await
    }

    /// Hard delete. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
