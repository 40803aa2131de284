use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use report_cell::report_routes;
use shared_utils::test_utils::{MockClinicRows, TestConfig};
use staff_cell::TargetStore;

async fn mount_table(mock_server: &MockServer, table: &str, rows: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/rest/v1/{}", table)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(mock_server)
        .await;
}

async fn seeded_clinic() -> MockServer {
    let mock_server = MockServer::start().await;
    let (sarah, gym, client) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    mount_table(
        &mock_server,
        "appointments",
        json!([
            MockClinicRows::appointment(sarah, client, gym, "2025-03-03T08:00:00Z", "2025-03-03T10:00:00Z", "completed", 300.0),
            MockClinicRows::appointment(sarah, client, gym, "2025-03-05T14:00:00Z", "2025-03-05T15:00:00Z", "completed", 150.0),
        ]),
    )
    .await;
    mount_table(
        &mock_server,
        "financial_transactions",
        json!([MockClinicRows::transaction(300.0, "payment", "2025-03-03T10:00:00Z")]),
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
    mount_table(&mock_server, "clients", json!([MockClinicRows::client(client, "Lena Park", "2024-02-01")])).await;

    mock_server
}

fn app(url: Option<String>) -> Router {
    let config = match url {
        Some(url) => TestConfig::with_url(url),
        None => TestConfig::default(),
    };
    report_routes(config.to_arc(), Arc::new(TargetStore::new(9000.0)))
}

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn unknown_report_type_is_bad_request() {
    let response = get(app(None), "/reports?type=monthly&date=2025-03-03").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "Unknown report type");
}

#[tokio::test]
async fn out_of_range_report_date_is_bad_request() {
    let response = get(app(None), "/reports?type=daily&date=%2B262143-12-31").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "Invalid date '+262143-12-31', expected YYYY-MM-DD");
}

#[tokio::test]
async fn unknown_export_format_is_bad_request() {
    let response = get(app(None), "/reports/export?type=daily&date=2025-03-03&format=xlsx").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"], "Unknown export format: xlsx");
}

#[tokio::test]
async fn weekly_report_covers_monday_to_sunday() {
    let mock_server = seeded_clinic().await;

    let response = get(app(Some(mock_server.uri())), "/reports?type=weekly&date=2025-03-05").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["week_start"], "2025-03-03");
    assert_eq!(body["week_end"], "2025-03-09");
    assert_eq!(body["financial_dashboard"]["total_revenue"], 450.0);

    let heatmap = body["operational_metrics"]["room_utilization_heatmap"].as_array().unwrap();
    assert_eq!(heatmap.len(), 5);
    assert!(heatmap.iter().all(|row| row.as_array().unwrap().len() == 6));
    assert_eq!(heatmap[0][0], 100.0);
    assert_eq!(body["operational_metrics"]["days"][5], "Sat");
    assert_eq!(body["operational_metrics"]["staff_productivity"][0]["below_target"], true);
}

#[tokio::test]
async fn daily_report_exports_as_csv_attachment() {
    let mock_server = seeded_clinic().await;

    let response = get(
        app(Some(mock_server.uri())),
        "/reports/export?type=daily&date=2025-03-03&format=csv",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"report-daily-2025-03-03.csv\""
    );

    let csv = body_text(response).await;
    let header_line = csv.lines().next().unwrap();
    assert!(header_line.starts_with("ai_suggestion,"));
    assert!(header_line.contains("financial_pulse.revenue"));
    assert!(header_line.contains("employees.name"));
    assert!(csv.contains("Sarah Chen"));
}

#[tokio::test]
async fn analytics_summary_exports_as_json() {
    let mock_server = seeded_clinic().await;

    let response = get(app(Some(mock_server.uri())), "/analytics/export?date=2025-03-03&format=json").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"analytics-2025-03-03.json\""
    );
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["revenue"], 300.0);
    assert_eq!(body["trend"].as_array().unwrap().len(), 7);
}
