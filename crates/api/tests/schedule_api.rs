//! HTTP-level tests for schedule assignments, requests and settings.
//!
//! These need a PostgreSQL server reachable through `DATABASE_URL` and are
//! ignored by default: `cargo test -p timetable-api -- --ignored`.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get, get_auth, post_json_auth, put_json_auth, token};
use serde_json::json;
use sqlx::PgPool;
use timetable_core::types::EntityId;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Seed {
    cs101: String,
    cs999: String,
    i1: String,
    i2: String,
    r1: String,
    r2: String,
}

async fn seed(pool: &PgPool) -> Seed {
    let id = || EntityId::generate().to_string();
    let s = Seed {
        cs101: id(),
        cs999: id(),
        i1: id(),
        i2: id(),
        r1: id(),
        r2: id(),
    };
    for (id, code) in [(&s.cs101, "CS101"), (&s.cs999, "CS999")] {
        sqlx::query("INSERT INTO courses (id, code, name) VALUES ($1, $2, $2)")
            .bind(id)
            .bind(code)
            .execute(pool)
            .await
            .unwrap();
    }
    for (id, name) in [(&s.i1, "Dr. Ada Lovelace"), (&s.i2, "Dr. Alan Turing")] {
        sqlx::query("INSERT INTO instructors (id, name, max_hours_per_week) VALUES ($1, $2, 3)")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await
            .unwrap();
    }
    for (id, name) in [(&s.r1, "Room 101"), (&s.r2, "Room 202")] {
        sqlx::query("INSERT INTO rooms (id, name, building) VALUES ($1, $2, 'Main Hall')")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await
            .unwrap();
    }
    s
}

fn payload(
    course: &str,
    instructor: &str,
    room: &str,
    start: &str,
    end: &str,
) -> serde_json::Value {
    json!({
        "courseId": course,
        "instructorId": instructor,
        "roomId": room,
        "dayOfWeek": "Monday",
        "startTime": start,
        "endTime": end,
        "semester": "First Term",
        "year": 2024,
    })
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn room_overlap_is_created_with_conflicts(pool: PgPool) {
    let s = seed(&pool).await;
    let admin = token("admin");

    let first = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/schedules",
        payload(&s.cs101, &s.i1, &s.r1, "09:00", "10:30"),
        &admin,
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let json = body_json(first).await;
    assert_eq!(json["hasConflicts"], false);
    assert_eq!(json["schedule"]["status"], "published");
    assert_eq!(json["schedule"]["academicYear"], "2024-2025");

    let second = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/schedules",
        payload(&s.cs999, &s.i2, &s.r1, "10:00", "11:00"),
        &admin,
    )
    .await;
    assert_eq!(second.status(), StatusCode::CREATED);
    let json = body_json(second).await;
    assert_eq!(json["hasConflicts"], true);
    assert_eq!(json["schedule"]["status"], "conflict");
    assert_eq!(json["conflicts"].as_array().unwrap().len(), 1);
    assert!(json["conflicts"][0]
        .as_str()
        .unwrap()
        .starts_with("Room is already booked during this time"));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn duplicate_is_rejected_without_second_row(pool: PgPool) {
    let s = seed(&pool).await;
    let admin = token("admin");
    let body = payload(&s.cs101, &s.i1, &s.r1, "09:00", "10:30");

    let first = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/schedules",
        body.clone(),
        &admin,
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/schedules",
        body,
        &admin,
    )
    .await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let json = body_json(second).await;
    assert_eq!(json["code"], "DUPLICATE_SCHEDULE");

    let list = get_auth(common::build_test_app(pool), "/api/v1/schedules", &admin).await;
    let json = body_json(list).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn unknown_room_returns_404(pool: PgPool) {
    let s = seed(&pool).await;
    let ghost = EntityId::generate().to_string();

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/schedules",
        payload(&s.cs101, &s.i1, &ghost, "09:00", "10:30"),
        &token("admin"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn update_and_delete_round(pool: PgPool) {
    let s = seed(&pool).await;
    let admin = token("admin");

    let created = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/schedules",
        payload(&s.cs101, &s.i1, &s.r1, "09:00", "10:30"),
        &admin,
    )
    .await;
    let id = body_json(created).await["schedule"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Moving within its own slot only overlaps itself.
    let updated = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/schedules/{id}"),
        json!({ "startTime": "09:30", "roomId": s.r2 }),
        &admin,
    )
    .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let json = body_json(updated).await;
    assert_eq!(json["hasConflicts"], false);
    assert_eq!(json["schedule"]["startTime"], "09:30");
    assert_eq!(json["schedule"]["roomName"], "Room 202");

    let deleted = delete_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/schedules/{id}"),
        &admin,
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let again = delete_auth(
        common::build_test_app(pool),
        &format!("/api/v1/schedules/{id}"),
        &admin,
    )
    .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn workload_flags_over_limit(pool: PgPool) {
    let s = seed(&pool).await;
    let admin = token("admin");
    for (course, room, start, end) in [
        (&s.cs101, &s.r1, "08:00", "10:00"),
        (&s.cs999, &s.r2, "13:00", "15:00"),
    ] {
        let response = post_json_auth(
            common::build_test_app(pool.clone()),
            "/api/v1/schedules",
            payload(course, &s.i1, room, start, end),
            &admin,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/v1/instructors/{}/workload?semester=First%20Term&year=2024", s.i1),
        &token("student"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["totalAssignments"], 2);
    assert_eq!(json["data"]["totalHours"], 4.0);
    assert_eq!(json["data"]["overLimit"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn allowing_overlap_suppresses_instructor_conflicts(pool: PgPool) {
    let s = seed(&pool).await;
    let admin = token("admin");

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/admin/settings/scheduling",
        json!({ "allowOverlappingClasses": true }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["allowOverlappingClasses"], true);
    assert_eq!(json["data"]["autoConflictDetection"], true);

    post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/schedules",
        payload(&s.cs101, &s.i1, &s.r1, "09:00", "10:30"),
        &admin,
    )
    .await;
    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/v1/schedules",
        payload(&s.cs999, &s.i1, &s.r2, "10:00", "11:00"),
        &admin,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["hasConflicts"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn health_reports_active_conflict_policy(pool: PgPool) {
    let response = get(common::build_test_app(pool.clone()), "/health").await;
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["conflict_policy"]["autoConflictDetection"], true);
    assert_eq!(json["conflict_policy"]["allowOverlappingClasses"], false);

    put_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/admin/settings/scheduling",
        json!({ "allowOverlappingClasses": true }),
        &token("admin"),
    )
    .await;
    let json = body_json(get(common::build_test_app(pool), "/health").await).await;
    assert_eq!(json["conflict_policy"]["allowOverlappingClasses"], true);
}

// ---------------------------------------------------------------------------
// Room requests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires PostgreSQL via DATABASE_URL"]
async fn request_flagged_against_approved_booking(pool: PgPool) {
    let s = seed(&pool).await;
    let instructor = token("instructor");
    let admin = token("admin");
    let body = |purpose: &str| {
        json!({
            "instructorId": s.i1,
            "roomId": s.r1,
            "date": "2024-10-07",
            "startTime": "09:00",
            "endTime": "10:00",
            "purpose": purpose,
        })
    };

    let first = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/schedule-requests",
        body("Thesis defense"),
        &instructor,
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_json(first).await;
    assert_eq!(first["data"]["dayOfWeek"], "Monday");
    assert_eq!(first["data"]["conflictFlag"], false);
    let first_id = first["data"]["id"].as_str().unwrap().to_string();

    let approved = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/schedule-requests/{first_id}/status"),
        json!({ "status": "approved" }),
        &admin,
    )
    .await;
    assert_eq!(approved.status(), StatusCode::OK);

    let second = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/v1/schedule-requests",
        body("Review session"),
        &instructor,
    )
    .await;
    let second = body_json(second).await;
    assert_eq!(second["data"]["conflictFlag"], true);

    // Approved requests are terminal.
    let reopen = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/v1/schedule-requests/{first_id}/status"),
        json!({ "status": "pending" }),
        &admin,
    )
    .await;
    assert_eq!(reopen.status(), StatusCode::BAD_REQUEST);
}
