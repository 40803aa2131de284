use axum::{
    body::{to_bytes, Body},
    extract::{Extension, State},
    http::{Request, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::TypedHeader;
use chrono::{TimeZone, Utc};
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::handlers::*;
use appointment_cell::models::*;
use appointment_cell::appointment_routes;
use shared_models::clinic::AppointmentType;
use shared_models::error::AppError;
use shared_utils::test_utils::{JwtTestUtils, MockClinicRows, TestConfig, TestUser};

fn create_auth_header(token: &str) -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer(token).unwrap())
}

fn manual_request(employee_id: Uuid, room_id: Uuid) -> ManualBookingRequest {
    ManualBookingRequest {
        employee_id,
        client_id: Uuid::new_v4(),
        room_id,
        scheduled_start: Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap(),
        scheduled_end: Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap(),
        appointment_type: AppointmentType::Physiotherapy,
        base_price: 150.0,
        discount_amount: Some(10.0),
        session_notes: None,
        status: None,
    }
}

async fn mount_overlaps(mock_server: &MockServer, column: &str, id: Uuid, rows: Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param(column, format!("eq.{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(mock_server)
        .await;
}

/// One therapist, one room and the given bookings for the day.
async fn mount_clinic_day(mock_server: &MockServer, employee_id: Uuid, room_id: Uuid, booked: Value) {
    let tables = [
        ("appointments", booked),
        ("employees", json!([MockClinicRows::employee(employee_id, "Sarah Chen", "partner", &["massage"])])),
        ("rooms", json!([MockClinicRows::room(room_id, "Physio Room 1")])),
        ("employee_work_schedules", json!([])),
        ("schedule_exceptions", json!([])),
        ("service_catalog", json!([MockClinicRows::service("Massage", 95.0, 60)])),
    ];
    for (table, rows) in tables {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{}", table)))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(mock_server)
            .await;
    }
}

fn smart_request(client_id: Uuid, duration_minutes: Option<i64>) -> SmartBookingRequest {
    SmartBookingRequest {
        client_id,
        date: chrono::NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
        appointment_type: AppointmentType::Massage,
        duration_minutes,
        employee_id: None,
        room_id: None,
        preferred_time: None,
        base_price: None,
        session_notes: None,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn manual_book_creates_appointment() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(mock_server.uri());
    let (employee_id, room_id) = (Uuid::new_v4(), Uuid::new_v4());

    mount_overlaps(&mock_server, "room_id", room_id, json!([])).await;
    mount_overlaps(&mock_server, "employee_id", employee_id, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([MockClinicRows::appointment(
            employee_id,
            Uuid::new_v4(),
            room_id,
            "2025-03-03T09:00:00Z",
            "2025-03-03T10:00:00Z",
            "scheduled",
            140.0
        )])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let user = TestUser::associate("amy@clinic.test");
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));

    let (status, Json(body)) = manual_book(
        State(config.to_arc()),
        create_auth_header(&token),
        Extension(user.to_user()),
        Json(manual_request(employee_id, room_id)),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["appointment"]["final_price"], 140.0);
}

#[tokio::test]
async fn manual_book_rejects_room_overlap() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(mock_server.uri());
    let (employee_id, room_id) = (Uuid::new_v4(), Uuid::new_v4());

    mount_overlaps(
        &mock_server,
        "room_id",
        room_id,
        json!([MockClinicRows::appointment(
            Uuid::new_v4(),
            Uuid::new_v4(),
            room_id,
            "2025-03-03T09:30:00Z",
            "2025-03-03T10:30:00Z",
            "scheduled",
            100.0
        )]),
    )
    .await;
    mount_overlaps(&mock_server, "employee_id", employee_id, json!([])).await;

    let user = TestUser::associate("amy@clinic.test");
    let result = manual_book(
        State(config.to_arc()),
        create_auth_header("token"),
        Extension(user.to_user()),
        Json(manual_request(employee_id, room_id)),
    )
    .await;

    match result {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "Room is already booked for this timeslot."),
        other => panic!("expected conflict, got {:?}", other.map(|(status, _)| status)),
    }
}

#[tokio::test]
async fn manual_book_rejects_therapist_overlap() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(mock_server.uri());
    let (employee_id, room_id) = (Uuid::new_v4(), Uuid::new_v4());

    mount_overlaps(&mock_server, "room_id", room_id, json!([])).await;
    mount_overlaps(
        &mock_server,
        "employee_id",
        employee_id,
        json!([MockClinicRows::appointment(
            employee_id,
            Uuid::new_v4(),
            Uuid::new_v4(),
            "2025-03-03T08:30:00Z",
            "2025-03-03T09:30:00Z",
            "scheduled",
            100.0
        )]),
    )
    .await;

    let user = TestUser::associate("amy@clinic.test");
    let result = manual_book(
        State(config.to_arc()),
        create_auth_header("token"),
        Extension(user.to_user()),
        Json(manual_request(employee_id, room_id)),
    )
    .await;

    match result {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "Therapist is already booked for this timeslot."),
        other => panic!("expected conflict, got {:?}", other.map(|(status, _)| status)),
    }
}

#[tokio::test]
async fn cancelled_overlap_does_not_block_booking() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(mock_server.uri());
    let (employee_id, room_id) = (Uuid::new_v4(), Uuid::new_v4());

    let cancelled = MockClinicRows::appointment(
        employee_id,
        Uuid::new_v4(),
        room_id,
        "2025-03-03T09:00:00Z",
        "2025-03-03T10:00:00Z",
        "cancelled",
        100.0,
    );
    mount_overlaps(&mock_server, "room_id", room_id, json!([cancelled.clone()])).await;
    mount_overlaps(&mock_server, "employee_id", employee_id, json!([cancelled.clone()])).await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([cancelled])))
        .mount(&mock_server)
        .await;

    let user = TestUser::associate("amy@clinic.test");
    let result = manual_book(
        State(config.to_arc()),
        create_auth_header("token"),
        Extension(user.to_user()),
        Json(manual_request(employee_id, room_id)),
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn outsider_cannot_book() {
    let config = TestConfig::default();
    let user = TestUser::outsider("someone@mail.test");

    let result = manual_book(
        State(config.to_arc()),
        create_auth_header("token"),
        Extension(user.to_user()),
        Json(manual_request(Uuid::new_v4(), Uuid::new_v4())),
    )
    .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn smart_book_takes_first_free_slot() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(mock_server.uri());
    let (employee_id, room_id, client_id) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockClinicRows::appointment(
            employee_id,
            Uuid::new_v4(),
            room_id,
            "2025-03-03T08:00:00Z",
            "2025-03-03T09:00:00Z",
            "scheduled",
            100.0
        )])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/employees"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockClinicRows::employee(
            employee_id,
            "Sarah Chen",
            "partner",
            &["massage"]
        )])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/rooms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockClinicRows::room(room_id, "Physio Room 1")])))
        .mount(&mock_server)
        .await;
    for table in ["employee_work_schedules", "schedule_exceptions"] {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{}", table)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/rest/v1/service_catalog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockClinicRows::service("Massage", 95.0, 60)])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([MockClinicRows::appointment(
            employee_id,
            client_id,
            room_id,
            "2025-03-03T09:00:00Z",
            "2025-03-03T10:00:00Z",
            "scheduled",
            95.0
        )])))
        .mount(&mock_server)
        .await;

    let user = TestUser::new("desk@clinic.test", "reception");
    let request = SmartBookingRequest {
        client_id,
        date: chrono::NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
        appointment_type: AppointmentType::Massage,
        duration_minutes: None,
        employee_id: None,
        room_id: None,
        preferred_time: None,
        base_price: None,
        session_notes: None,
    };

    let (status, Json(body)) = smart_book(
        State(config.to_arc()),
        create_auth_header("token"),
        Extension(user.to_user()),
        Json(request),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["chosen"]["start"], "2025-03-03T09:00:00Z");
    assert_eq!(body["chosen"]["therapist"], "Sarah Chen");
    assert_eq!(body["alternatives"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn routes_require_token_for_booking() {
    let app = appointment_routes(TestConfig::default().to_arc());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/appointments/manual-book")
                .header("content-type", "application/json")
                .body(Body::from(json!({}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Missing authorization header");
}

#[tokio::test]
async fn scheduler_without_date_is_bad_request() {
    let app = appointment_routes(TestConfig::default().to_arc());

    let response = app
        .oneshot(Request::builder().uri("/scheduler?type=physio").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn scheduler_rejects_out_of_range_year() {
    let app = appointment_routes(TestConfig::default().to_arc());

    let response = app
        .oneshot(Request::builder().uri("/scheduler?date=%2B262143-12-31").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn suggestions_reject_unknown_type() {
    let app = appointment_routes(TestConfig::default().to_arc());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/appointments/suggestions?date=2025-03-03&appointment_type=yoga")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Unknown appointment type: yoga");
}

#[tokio::test]
async fn smart_book_on_a_full_day_is_bad_request() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(mock_server.uri());
    let (employee_id, room_id) = (Uuid::new_v4(), Uuid::new_v4());
    mount_clinic_day(
        &mock_server,
        employee_id,
        room_id,
        json!([MockClinicRows::appointment(
            employee_id,
            Uuid::new_v4(),
            room_id,
            "2025-03-03T08:00:00Z",
            "2025-03-03T18:00:00Z",
            "scheduled",
            900.0
        )]),
    )
    .await;

    let user = TestUser::new("desk@clinic.test", "reception");
    let err = smart_book(
        State(config.to_arc()),
        create_auth_header("token"),
        Extension(user.to_user()),
        Json(smart_request(Uuid::new_v4(), None)),
    )
    .await
    .unwrap_err();

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No available slot found.");
}

#[tokio::test]
async fn smart_book_rejects_duration_longer_than_the_day() {
    let mock_server = MockServer::start().await;
    let config = TestConfig::with_url(mock_server.uri());
    mount_clinic_day(&mock_server, Uuid::new_v4(), Uuid::new_v4(), json!([])).await;

    let user = TestUser::new("desk@clinic.test", "reception");
    let err = smart_book(
        State(config.to_arc()),
        create_auth_header("token"),
        Extension(user.to_user()),
        Json(smart_request(Uuid::new_v4(), Some(1_000_000_000_000))),
    )
    .await
    .unwrap_err();

    assert_matches::assert_matches!(err, AppError::ValidationError(_));
}

#[tokio::test]
async fn suggestions_list_is_capped_by_limit() {
    let mock_server = MockServer::start().await;
    mount_clinic_day(&mock_server, Uuid::new_v4(), Uuid::new_v4(), json!([])).await;
    let app = appointment_routes(TestConfig::with_url(mock_server.uri()).to_arc());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/appointments/suggestions?date=2025-03-03&appointment_type=massage&limit=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let suggestions = body["suggestions"].as_array().unwrap();
    assert_eq!(body["date"], "2025-03-03");
    assert_eq!(suggestions.len(), 2);
    assert_eq!(body["total"], suggestions.len());
    assert_eq!(suggestions[0]["therapist"], "Sarah Chen");
}

#[tokio::test]
async fn suggestions_reject_oversized_duration() {
    let mock_server = MockServer::start().await;
    mount_clinic_day(&mock_server, Uuid::new_v4(), Uuid::new_v4(), json!([])).await;
    let app = appointment_routes(TestConfig::with_url(mock_server.uri()).to_arc());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/appointments/suggestions?date=2025-03-03&appointment_type=massage&duration_minutes=1000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "duration_minutes must be between 1 and 600");
}
