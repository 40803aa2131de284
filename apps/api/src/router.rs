use std::sync::Arc;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use analytics_cell::analytics_routes;
use appointment_cell::appointment_routes;
use report_cell::report_routes;
use shared_config::AppConfig;
use staff_cell::{staff_routes, TargetStore};

async fn health(State(config): State<Arc<AppConfig>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "configured": config.is_configured(),
        "timestamp": Utc::now(),
    }))
}

pub fn create_router(state: Arc<AppConfig>) -> Router {
    // Targets outlive any single request; staff and reports share them
    let targets = Arc::new(TargetStore::new(state.targets.employee_revenue));

    let api = Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .merge(appointment_routes(state.clone()))
        .merge(analytics_routes(state.clone()))
        .merge(staff_routes(state.clone(), targets.clone()))
        .merge(report_routes(state, targets));

    Router::new()
        .route("/", get(|| async { "Clinic operations API is running!" }))
        .nest("/api", api)
}
