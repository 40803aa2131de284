// libs/report-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;
use staff_cell::TargetStore;

use crate::handlers::{self, ReportState};

pub fn report_routes(config: Arc<AppConfig>, targets: Arc<TargetStore>) -> Router {
    Router::new()
        .route("/reports", get(handlers::get_report))
        .route("/reports/export", get(handlers::export_report))
        .route("/analytics/export", get(handlers::export_analytics))
        .with_state(ReportState { config, targets })
}
