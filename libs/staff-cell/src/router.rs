// libs/staff-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, StaffState};
use crate::services::TargetStore;

pub fn staff_routes(config: Arc<AppConfig>, targets: Arc<TargetStore>) -> Router {
    let state = StaffState {
        config: config.clone(),
        targets,
    };

    // Only management may move targets
    let protected_routes = Router::new()
        .route("/employees/{id}/target", put(handlers::set_target))
        .layer(middleware::from_fn_with_state(config, auth_middleware));

    let public_routes = Router::new()
        .route("/employees", get(handlers::list_employees))
        .route("/employees/{id}/advice", get(handlers::employee_advice))
        .route("/analytics/compensation", get(handlers::get_compensation));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .with_state(state)
}
