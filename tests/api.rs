//! HTTP-level tests for request validation, routing and rate limiting.
//!
//! The pool connects lazily and every request here is rejected before it
//! reaches the database, so no MySQL server is needed.

use actix_web::{App, http::StatusCode, test, web::Data};
use serde_json::{Value, json};
use sqlx::mysql::MySqlPoolOptions;

use hr_pro::routes::{build_rate_limiter, configure, json_config, query_config};

// =============================================================================
// Test Helpers
// =============================================================================

fn peer() -> std::net::SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

macro_rules! test_app {
    ($requests_per_min:expr) => {{
        let pool = MySqlPoolOptions::new()
            .connect_lazy("mysql://hr:hr@127.0.0.1:3306/hr_test")
            .unwrap();
        let limiter = build_rate_limiter($requests_per_min).unwrap();

        test::init_service(
            App::new()
                .app_data(Data::new(pool))
                .app_data(json_config())
                .app_data(query_config())
                .configure(|cfg| configure(cfg, "/api", &limiter)),
        )
        .await
    }};
}

/// Sends the request from a fixed peer and returns the status with the JSON body.
macro_rules! send {
    ($app:expr, $req:expr $(,)?) => {{
        let resp = test::call_service(&$app, $req.peer_addr(peer()).to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }};
}

// =============================================================================
// Leave requests
// =============================================================================

#[actix_web::test]
async fn test_leave_with_reversed_dates_is_bad_request() {
    let app = test_app!(1000);

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/leave").set_json(json!({
            "employee_id": 1,
            "leave_type": "annual",
            "start_date": "2026-04-10",
            "end_date": "2026-04-01"
        })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "start_date cannot be after end_date");
}

#[actix_web::test]
async fn test_leave_with_unknown_category_is_bad_request() {
    let app = test_app!(1000);

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/leave").set_json(json!({
            "employee_id": 1,
            "leave_type": "unpaid",
            "start_date": "2026-04-01",
            "end_date": "2026-04-02"
        })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("unpaid"));
}

#[actix_web::test]
async fn test_leave_day_count_larger_than_range_is_bad_request() {
    let app = test_app!(1000);

    let (status, _) = send!(
        app,
        test::TestRequest::post().uri("/api/leave").set_json(json!({
            "employee_id": 1,
            "leave_type": "sick",
            "start_date": "2026-04-01",
            "end_date": "2026-04-02",
            "day_count": 5
        })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_leave_list_rejects_unknown_status_filter() {
    let app = test_app!(1000);

    let (status, _) = send!(
        app,
        test::TestRequest::get().uri("/api/leave?status=archived"),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Employees
// =============================================================================

#[actix_web::test]
async fn test_create_employee_requires_employee_number() {
    let app = test_app!(1000);

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/employees").set_json(json!({
            "employee_number": "",
            "first_name": "Ali",
            "joined_date": "2024-01-01"
        })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "employee_number must not be empty");
}

#[actix_web::test]
async fn test_create_employee_without_joined_date_is_bad_request() {
    let app = test_app!(1000);

    let (status, _) = send!(
        app,
        test::TestRequest::post().uri("/api/employees").set_json(json!({
            "employee_number": "JJ-0500",
            "first_name": "Ali"
        })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_update_employee_rejects_unknown_column() {
    let app = test_app!(1000);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/employees/7")
            .set_json(json!({ "created_at": "2020-01-01" })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Field 'created_at' cannot be updated");
}

#[actix_web::test]
async fn test_update_employee_rejects_invalid_gender() {
    let app = test_app!(1000);

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/employees/7")
            .set_json(json!({ "gender": "robot" })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_update_employee_cannot_clear_required_column() {
    let app = test_app!(1000);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/employees/7")
            .set_json(json!({ "first_name": null })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "first_name must not be empty");
}

#[actix_web::test]
async fn test_non_numeric_employee_id_is_not_found() {
    let app = test_app!(1000);

    let (status, _) = send!(app, test::TestRequest::get().uri("/api/employees/abc"));

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Training
// =============================================================================

#[actix_web::test]
async fn test_trainer_requires_name() {
    let app = test_app!(1000);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/trainers")
            .set_json(json!({ "name": "  ", "organization": "Red Crescent" })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name must not be empty");
}

#[actix_web::test]
async fn test_trainer_update_rejects_unknown_column() {
    let app = test_app!(1000);

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/trainers/2")
            .set_json(json!({ "id": 99 })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_program_duration_must_be_positive() {
    let app = test_app!(1000);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/training-programs")
            .set_json(json!({ "title": "Fire Safety", "duration_hours": 0 })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "duration_hours must be positive");
}

#[actix_web::test]
async fn test_program_update_with_empty_payload_is_bad_request() {
    let app = test_app!(1000);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/training-programs/1")
            .set_json(json!({})),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No fields provided for update");
}

#[actix_web::test]
async fn test_feedback_rating_out_of_range_is_bad_request() {
    let app = test_app!(1000);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/training-sessions/3/feedback")
            .set_json(json!({ "employee_id": 1, "rating": 9 })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "rating must be between 1 and 5");
}

#[actix_web::test]
async fn test_session_with_reversed_dates_is_bad_request() {
    let app = test_app!(1000);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/training-sessions")
            .set_json(json!({
                "program_id": 1,
                "trainer_id": 1,
                "start_date": "2026-05-02",
                "end_date": "2026-05-01"
            })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_session_cannot_be_moved_back_to_scheduled() {
    let app = test_app!(1000);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/training-sessions/3")
            .set_json(json!({ "status": "scheduled" })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "status must be completed or cancelled");
}

#[actix_web::test]
async fn test_participant_status_must_be_known() {
    let app = test_app!(1000);

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/training-sessions/3/participants/1")
            .set_json(json!({ "status": "sleeping" })),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Analytics
// =============================================================================

#[actix_web::test]
async fn test_breakdown_on_unknown_field_is_bad_request() {
    let app = test_app!(1000);

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri("/api/analytics/employees/salary_usd"),
    );

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot group employees by 'salary_usd'");
}

// =============================================================================
// Routing and rate limiting
// =============================================================================

#[actix_web::test]
async fn test_routes_outside_prefix_are_not_found() {
    let app = test_app!(1000);

    let (status, _) = send!(app, test::TestRequest::get().uri("/employees"));

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_requests_over_quota_are_throttled() {
    let app = test_app!(2);

    let mut statuses = Vec::new();
    for _ in 0..3 {
        let req = test::TestRequest::get()
            .uri("/api/analytics/employees/unknown")
            .peer_addr(peer())
            .to_request();
        let status = match test::try_call_service(&app, req).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        };
        statuses.push(status);
    }

    assert_eq!(
        statuses,
        vec![
            StatusCode::BAD_REQUEST,
            StatusCode::BAD_REQUEST,
            StatusCode::TOO_MANY_REQUESTS
        ]
    );
}
