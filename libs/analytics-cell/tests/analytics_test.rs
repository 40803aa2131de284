use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use analytics_cell::analytics_routes;
use shared_utils::test_utils::{MockClinicRows, TestConfig};

async fn mount_table(mock_server: &MockServer, table: &str, rows: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/rest/v1/{}", table)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(mock_server)
        .await;
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn seeded_clinic() -> MockServer {
    let mock_server = MockServer::start().await;
    let (sarah, gym, client) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    mount_table(
        &mock_server,
        "appointments",
        json!([
            MockClinicRows::appointment(sarah, client, gym, "2025-03-03T09:00:00Z", "2025-03-03T10:00:00Z", "completed", 250.0),
            MockClinicRows::appointment(sarah, client, gym, "2025-03-03T13:00:00Z", "2025-03-03T14:00:00Z", "completed", 150.0),
        ]),
    )
    .await;
    mount_table(
        &mock_server,
        "financial_transactions",
        json!([MockClinicRows::transaction(400.0, "payment", "2025-03-03T14:00:00Z")]),
    )
    .await;
    mount_table(&mock_server, "employee_performance", json!([])).await;
    mount_table(&mock_server, "client_feedback", json!([])).await;
    mount_table(&mock_server, "equipment_usage", json!([])).await;
    mount_table(&mock_server, "rooms", json!([MockClinicRows::room(gym, "Gym Area")])).await;
    mount_table(
        &mock_server,
        "employees",
        json!([MockClinicRows::employee(sarah, "Sarah Chen", "partner", &["physiotherapy"])]),
    )
    .await;
    mount_table(
        &mock_server,
        "clients",
        json!([MockClinicRows::client(client, "Lena Park", "2024-02-01")]),
    )
    .await;

    mock_server
}

#[tokio::test]
async fn dashboard_reports_revenue_and_gap_alert() {
    let mock_server = seeded_clinic().await;
    let app = analytics_routes(TestConfig::with_url(mock_server.uri()).to_arc());

    let (status, body) = get(app, "/analytics/dashboard?date=2025-03-03").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dailyRevenue"]["value"], 400.0);
    assert_eq!(body["cashCollected"]["rate"], 100.0);
    assert_eq!(body["topPerformer"]["name"], "Sarah Chen");
    let alerts = body["alerts"].as_array().unwrap();
    assert!(alerts
        .iter()
        .any(|a| a["type"] == "warning" && a["message"] == "Gym Area idle 3 hrs (10:00-13:00) - scheduling gap"));
}

#[tokio::test]
async fn invalid_date_is_bad_request() {
    let app = analytics_routes(TestConfig::default().to_arc());

    let (status, body) = get(app, "/analytics/dashboard?date=yesterday").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid date 'yesterday', expected YYYY-MM-DD");
}

#[tokio::test]
async fn far_future_date_is_bad_request() {
    let app = analytics_routes(TestConfig::default().to_arc());

    let (status, body) = get(app, "/analytics/dashboard?date=%2B262143-12-31").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid date '+262143-12-31', expected YYYY-MM-DD");
}

#[tokio::test]
async fn inverted_range_is_bad_request() {
    let app = analytics_routes(TestConfig::default().to_arc());

    let (status, _) = get(app, "/analytics/financial?from=2025-03-10&to=2025-03-01").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn summary_carries_seven_day_trend() {
    let mock_server = seeded_clinic().await;
    let app = analytics_routes(TestConfig::with_url(mock_server.uri()).to_arc());

    let (status, body) = get(app, "/analytics?date=2025-03-03").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revenue"], 400.0);
    assert_eq!(body["retention"], 100.0);
    assert_eq!(body["uniqueClients"], 1);
    assert_eq!(body["trend"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn rooms_endpoint_badges_rooms() {
    let mock_server = seeded_clinic().await;
    let app = analytics_routes(TestConfig::with_url(mock_server.uri()).to_arc());

    let (status, body) = get(app, "/analytics/rooms?from=2025-03-03&to=2025-03-03").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rooms"][0]["utilization"], 20.0);
    assert_eq!(body["rooms"][0]["level"], "low");
    assert_eq!(body["highlyUtilized"], 0);
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&mock_server)
        .await;
    let app = analytics_routes(TestConfig::with_url(mock_server.uri()).to_arc());

    let (status, _) = get(app, "/analytics/employees?from=2025-03-01&to=2025-03-03").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
