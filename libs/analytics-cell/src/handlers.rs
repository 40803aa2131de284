// =====================================================================================
// ANALYTICS HANDLERS
// =====================================================================================

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::instrument;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AnalyticsSummary, Dashboard, DateQuery, EmployeeReport, FinancialReport, OptimizationReport,
    RangeQuery, RoomReport,
};
use crate::services::AnalyticsService;

#[instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let date = query.resolve()?;
    let dashboard = AnalyticsService::new(&state).dashboard(date).await?;
    Ok(Json(dashboard))
}

#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    let date = query.resolve()?;
    Ok(Json(AnalyticsService::new(&state).summary(date).await?))
}

#[instrument(skip(state))]
pub async fn get_financial(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<FinancialReport>, AppError> {
    let (from, to) = query.resolve()?;
    Ok(Json(AnalyticsService::new(&state).financial(from, to).await?))
}

#[instrument(skip(state))]
pub async fn get_rooms(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<RoomReport>, AppError> {
    let (from, to) = query.resolve()?;
    Ok(Json(AnalyticsService::new(&state).rooms(from, to).await?))
}

#[instrument(skip(state))]
pub async fn get_employees(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<EmployeeReport>, AppError> {
    let (from, to) = query.resolve()?;
    Ok(Json(AnalyticsService::new(&state).employees(from, to).await?))
}

#[instrument(skip(state))]
pub async fn get_optimization(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<OptimizationReport>, AppError> {
    let (from, to) = query.resolve()?;
    Ok(Json(AnalyticsService::new(&state).optimization(from, to).await?))
}
