/// Endpoint smoke suite for a running clinic operations API.
///
/// Point it at a server with `CLINIC_API_URL` (default http://localhost:3000).
/// Write checks run only when `CLINIC_API_TOKEN` holds a staff bearer token.
///
/// Test Categories:
/// - Health and configuration
/// - Scheduling reads and booking guards
/// - Analytics views
/// - Staff targets and advice
/// - Report cards and exports

use chrono::{Duration, Utc};
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Test client with optional bearer authentication
pub struct ApiTestClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiTestClient {
    pub fn from_env() -> Self {
        Self {
            client: Client::new(),
            base_url: std::env::var("CLINIC_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            auth_token: std::env::var("CLINIC_API_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<Response, reqwest::Error> {
        self.client.get(self.url(path)).send().await
    }

    pub async fn post(&self, path: &str, body: Value, authenticated: bool) -> Result<Response, reqwest::Error> {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let (true, Some(token)) = (authenticated, &self.auth_token) {
            request = request.bearer_auth(token);
        }
        request.send().await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Response, reqwest::Error> {
        let mut request = self.client.put(self.url(path)).json(&body);
        if let Some(ref token) = self.auth_token {
            request = request.bearer_auth(token);
        }
        request.send().await
    }
}

/// Test results tracker
#[derive(Debug, Default)]
pub struct TestResults {
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub failures: Vec<String>,
}

impl TestResults {
    pub fn pass(&mut self, test_name: &str) {
        self.passed += 1;
        println!("✅ {}", test_name);
    }

    pub fn fail(&mut self, test_name: &str, error: &str) {
        self.failed += 1;
        self.failures.push(format!("{}: {}", test_name, error));
        println!("❌ {}: {}", test_name, error);
    }

    pub fn skip(&mut self, test_name: &str, reason: &str) {
        self.skipped += 1;
        println!("⚠️ {} (skipped: {})", test_name, reason);
    }

    /// Records a pass when the response carries the expected status.
    pub async fn expect(&mut self, test_name: &str, response: Result<Response, reqwest::Error>, expected: StatusCode) -> Option<Value> {
        match response {
            Ok(response) if response.status() == expected => {
                self.pass(test_name);
                Some(response.json().await.unwrap_or_default())
            }
            Ok(response) => {
                self.fail(test_name, &format!("Status: {}", response.status()));
                None
            }
            Err(e) => {
                self.fail(test_name, &e.to_string());
                None
            }
        }
    }

    pub fn summary(&self) {
        println!("\n📊 Test Summary:");
        println!("✅ Passed: {}", self.passed);
        println!("❌ Failed: {}", self.failed);
        println!("⚠️ Skipped: {}", self.skipped);

        if !self.failures.is_empty() {
            println!("\n🔍 Failures:");
            for failure in &self.failures {
                println!("  - {}", failure);
            }
        }
    }
}

pub async fn run_endpoint_tests() -> TestResults {
    let client = ApiTestClient::from_env();
    let mut results = TestResults::default();
    let today = Utc::now().date_naive();
    let week_ago = today - Duration::days(6);

    println!("🚀 Starting endpoint smoke tests");
    println!("📍 Base URL: {}", client.base_url);

    println!("\n🩺 Health");
    match results.expect("Health Check", client.get("/health").await, StatusCode::OK).await {
        Some(body) if body["configured"] == false => {
            println!("⚠️ Server reports missing Supabase settings; data checks will fail");
        }
        _ => {}
    }

    println!("\n📅 Scheduling");
    results
        .expect("Scheduler Board", client.get(&format!("/scheduler?date={}", today)).await, StatusCode::OK)
        .await;
    results
        .expect(
            "Slot Suggestions",
            client
                .get(&format!("/appointments/suggestions?date={}&appointment_type=physiotherapy&limit=3", today))
                .await,
            StatusCode::OK,
        )
        .await;
    results
        .expect(
            "Manual Booking Requires Token",
            client
                .post(
                    "/appointments/manual-book",
                    json!({
                        "employee_id": Uuid::new_v4(),
                        "client_id": Uuid::new_v4(),
                        "room_id": Uuid::new_v4(),
                        "scheduled_start": format!("{}T09:00:00Z", today),
                        "scheduled_end": format!("{}T10:00:00Z", today),
                        "appointment_type": "massage",
                        "base_price": 120.0
                    }),
                    false,
                )
                .await,
            StatusCode::UNAUTHORIZED,
        )
        .await;

    println!("\n📈 Analytics");
    for (name, path) in [
        ("Analytics Summary", format!("/analytics?date={}", today)),
        ("Morning Dashboard", format!("/analytics/dashboard?date={}", today)),
        ("Financial Breakdown", format!("/analytics/financial?from={}&to={}", week_ago, today)),
        ("Room Utilization", format!("/analytics/rooms?from={}&to={}", week_ago, today)),
        ("Employee Performance", format!("/analytics/employees?from={}&to={}", week_ago, today)),
        ("Optimization Hints", format!("/analytics/optimization?from={}&to={}", week_ago, today)),
        ("Compensation", format!("/analytics/compensation?from={}&to={}", week_ago, today)),
    ] {
        results.expect(name, client.get(&path).await, StatusCode::OK).await;
    }
    results
        .expect("Invalid Date Rejected", client.get("/analytics/dashboard?date=yesterday").await, StatusCode::BAD_REQUEST)
        .await;

    println!("\n👥 Staff");
    let employees = results.expect("Employee Listing", client.get("/employees").await, StatusCode::OK).await;
    let first_employee = employees
        .as_ref()
        .and_then(|body| body.as_array())
        .and_then(|list| list.first())
        .and_then(|employee| employee["id"].as_str())
        .map(str::to_string);

    match first_employee {
        Some(id) => {
            results
                .expect("Employee Advice", client.get(&format!("/employees/{}/advice", id)).await, StatusCode::OK)
                .await;
            if client.auth_token.is_some() {
                results
                    .expect(
                        "Set Revenue Target",
                        client.put(&format!("/employees/{}/target", id), json!({ "target": 10000.0 })).await,
                        StatusCode::OK,
                    )
                    .await;
            } else {
                results.skip("Set Revenue Target", "CLINIC_API_TOKEN not set");
            }
        }
        None => {
            results.skip("Employee Advice", "No employees listed");
            results.skip("Set Revenue Target", "No employees listed");
        }
    }

    println!("\n🗂️ Reports");
    results
        .expect("Daily Report", client.get(&format!("/reports?type=daily&date={}", today)).await, StatusCode::OK)
        .await;
    results
        .expect("Weekly Report", client.get(&format!("/reports?type=weekly&date={}", today)).await, StatusCode::OK)
        .await;
    results
        .expect("Unknown Report Type", client.get("/reports?type=monthly").await, StatusCode::BAD_REQUEST)
        .await;

    match client.get(&format!("/reports/export?type=daily&date={}&format=csv", today)).await {
        Ok(response) if response.status() == StatusCode::OK => {
            let is_csv = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("text/csv"));
            if is_csv {
                results.pass("CSV Report Export");
            } else {
                results.fail("CSV Report Export", "Unexpected content type");
            }
        }
        Ok(response) => results.fail("CSV Report Export", &format!("Status: {}", response.status())),
        Err(e) => results.fail("CSV Report Export", &e.to_string()),
    }

    results
}

/// Entry point for endpoint tests
#[tokio::main]
async fn main() {
    let results = run_endpoint_tests().await;
    results.summary();

    if results.failed > 0 {
        std::process::exit(1);
    }
}
