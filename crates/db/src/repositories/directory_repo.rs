//! Read access to the directory tables.
//!
//! The scheduling engine never writes these; they are maintained by the
//! surrounding administration tooling.

use sqlx::PgPool;

use crate::models::directory::{Course, Instructor, Room, Student};

const ROOM_COLUMNS: &str = "id, name, building, capacity, created_at, updated_at";
const COURSE_COLUMNS: &str = "id, code, name, credits, description, created_at, updated_at";
const INSTRUCTOR_COLUMNS: &str =
    "id, name, email, department, max_hours_per_week, created_at, updated_at";
const STUDENT_COLUMNS: &str = "id, name, email, created_at, updated_at";

pub struct RoomRepo;

impl RoomRepo {
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Room>, sqlx::Error> {
        let query = format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = $1");
        sqlx::query_as::<_, Room>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All rooms ordered by building, then name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Room>, sqlx::Error> {
        let query = format!("SELECT {ROOM_COLUMNS} FROM rooms ORDER BY building ASC, name ASC");
        sqlx::query_as::<_, Room>(&query).fetch_all(pool).await
    }
}

pub struct CourseRepo;

impl CourseRepo {
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All courses ordered by code.
    pub async fn list(pool: &PgPool) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY code ASC");
        sqlx::query_as::<_, Course>(&query).fetch_all(pool).await
    }
}

pub struct InstructorRepo;

impl InstructorRepo {
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Instructor>, sqlx::Error> {
        let query = format!("SELECT {INSTRUCTOR_COLUMNS} FROM instructors WHERE id = $1");
        sqlx::query_as::<_, Instructor>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All instructors ordered by name, unnamed last.
    pub async fn list(pool: &PgPool) -> Result<Vec<Instructor>, sqlx::Error> {
        let query = format!(
            "SELECT {INSTRUCTOR_COLUMNS} FROM instructors ORDER BY name ASC NULLS LAST, id ASC"
        );
        sqlx::query_as::<_, Instructor>(&query).fetch_all(pool).await
    }
}

pub struct StudentRepo;

impl StudentRepo {
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Student>, sqlx::Error> {
        let query = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1");
        sqlx::query_as::<_, Student>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Ids of the courses a student is enrolled in.
    pub async fn course_ids_for_student(
        pool: &PgPool,
        student_id: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT course_id FROM enrollments WHERE student_id = $1 ORDER BY course_id",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }
}
