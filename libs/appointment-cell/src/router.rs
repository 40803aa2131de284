// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // Writes need a staff token
    let protected_routes = Router::new()
        .route("/appointments/manual-book", post(handlers::manual_book))
        .route("/appointments/smart-book", post(handlers::smart_book))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let public_routes = Router::new()
        .route("/appointments/suggestions", get(handlers::suggestions))
        .route("/scheduler", get(handlers::scheduler_board));

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .with_state(state)
}
