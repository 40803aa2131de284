// =====================================================================================
// ANALYTICS CELL ROUTER
// =====================================================================================

use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers::{
    get_dashboard, get_employees, get_financial, get_optimization, get_rooms, get_summary,
};

pub fn analytics_routes(config: Arc<AppConfig>) -> Router {
    // Dashboards are read-only and public
    Router::new()
        .route("/analytics", get(get_summary))
        .route("/analytics/dashboard", get(get_dashboard))
        .route("/analytics/financial", get(get_financial))
        .route("/analytics/rooms", get(get_rooms))
        .route("/analytics/employees", get(get_employees))
        .route("/analytics/optimization", get(get_optimization))
        .with_state(config)
}
