//! Routing, authentication and input-validation tests.
//!
//! Every request here is rejected before a query runs, so the app is built
//! over a pool that never connects.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_offline_app, delete_auth, get, get_auth, post_json, post_json_auth,
    post_raw_auth, put_json_auth, token,
};
use serde_json::json;

#[tokio::test]
async fn missing_token_returns_401() {
    let response = get(build_offline_app(), "/api/v1/schedules").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn tampered_token_returns_401() {
    let mut forged = token("admin");
    forged.push('x');

    let response = get_auth(build_offline_app(), "/api/v1/schedules", &forged).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_role_returns_401() {
    let response = get_auth(build_offline_app(), "/api/v1/schedules", &token("janitor")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn anonymous_create_returns_401() {
    let response = post_json(build_offline_app(), "/api/v1/schedules", json!({})).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn student_cannot_create_schedule() {
    let response = post_json_auth(
        build_offline_app(),
        "/api/v1/schedules",
        json!({}),
        &token("student"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn instructor_cannot_change_settings() {
    let response = put_json_auth(
        build_offline_app(),
        "/api/v1/admin/settings/scheduling",
        json!({ "allowOverlappingClasses": true }),
        &token("instructor"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn student_cannot_file_room_request() {
    let response = post_json_auth(
        build_offline_app(),
        "/api/v1/schedule-requests",
        json!({}),
        &token("student"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn missing_fields_are_reported_before_any_lookup() {
    let response = post_json_auth(
        build_offline_app(),
        "/api/v1/schedules",
        json!({ "courseId": "65a1b2c3d4e5f60718293a01", "dayOfWeek": "Monday" }),
        &token("admin"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let message = json["message"].as_str().unwrap();
    assert!(message.starts_with("Missing required fields:"), "{message}");
    assert!(message.contains("instructorId"));
    assert!(message.contains("roomId"));
}

#[tokio::test]
async fn year_given_as_text_is_accepted() {
    let response = post_json_auth(
        build_offline_app(),
        "/api/v1/schedules",
        json!({ "semester": "First Term", "year": "2024" }),
        &token("admin"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    let message = json["message"].as_str().unwrap();
    assert!(message.contains("courseId"), "{message}");
    assert!(!message.contains("year"), "{message}");
}

#[tokio::test]
async fn wrongly_typed_body_returns_400_envelope() {
    let response = post_json_auth(
        build_offline_app(),
        "/api/v1/schedules",
        json!({ "semester": 5, "year": 2024 }),
        &token("admin"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn non_numeric_year_returns_400() {
    let response = post_json_auth(
        build_offline_app(),
        "/api/v1/schedules/check",
        json!({ "year": "20x4" }),
        &token("instructor"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["message"].as_str().unwrap().contains("year must be a number"));
}

#[tokio::test]
async fn unparseable_body_returns_400_envelope() {
    let response = post_raw_auth(
        build_offline_app(),
        "/api/v1/schedule-requests",
        "{ not json",
        &token("instructor"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn status_update_without_status_returns_400() {
    let response = put_json_auth(
        build_offline_app(),
        "/api/v1/schedule-requests/65a1b2c3d4e5f60718293a4b/status",
        json!({ "notes": "looks fine" }),
        &token("admin"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_path_id_returns_400() {
    let response = get_auth(
        build_offline_app(),
        "/api/v1/schedules/not-a-real-id",
        &token("student"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn malformed_id_on_delete_returns_400() {
    let response = delete_auth(
        build_offline_app(),
        "/api/v1/schedules/1234",
        &token("admin"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_status_filter_returns_400() {
    let response = get_auth(
        build_offline_app(),
        "/api/v1/schedules?status=archived",
        &token("student"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn response_carries_request_id() {
    let response = get(build_offline_app(), "/api/v1/schedules").await;

    assert!(
        response.headers().get("x-request-id").is_some(),
        "Response must contain an x-request-id header"
    );
}

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let response = get(build_offline_app(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert!(json.get("conflict_policy").is_none());
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = get(build_offline_app(), "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
