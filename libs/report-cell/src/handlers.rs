// =====================================================================================
// REPORT CELL HANDLERS
// =====================================================================================

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use analytics_cell::models::parse_date;
use analytics_cell::AnalyticsService;
use shared_config::AppConfig;
use shared_models::error::AppError;
use staff_cell::TargetStore;

use crate::models::{ExportFormat, Report, ReportError, ReportKind, ReportQuery};
use crate::services::{render, ReportService};

#[derive(Clone)]
pub struct ReportState {
    pub config: Arc<AppConfig>,
    pub targets: Arc<TargetStore>,
}

impl ReportState {
    fn service(&self) -> ReportService {
        ReportService::new(&self.config, self.targets.clone())
    }
}

fn resolve_date(query: &ReportQuery) -> Result<NaiveDate, ReportError> {
    Ok(parse_date(query.date.as_deref(), Utc::now().date_naive())?)
}

fn attachment<T: Serialize>(payload: &T, format: ExportFormat, stem: &str) -> Result<Response, ReportError> {
    let value = serde_json::to_value(payload).map_err(|e| ReportError::Export(e.to_string()))?;
    let body = render(&value, format)?;

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.{}\"", stem, format.extension()),
            ),
        ],
        body,
    )
        .into_response())
}

#[instrument(skip(state))]
pub async fn get_report(
    State(state): State<ReportState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Report>, AppError> {
    let kind = ReportKind::parse(query.kind.as_deref())?;
    let date = resolve_date(&query)?;

    Ok(Json(state.service().report(kind, date).await?))
}

#[instrument(skip(state))]
pub async fn export_report(
    State(state): State<ReportState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let kind = ReportKind::parse(query.kind.as_deref())?;
    let format = ExportFormat::parse(query.format.as_deref())?;
    let date = resolve_date(&query)?;

    let report = state.service().report(kind, date).await?;
    info!("Exporting {} report for {} as {}", kind.name(), date, format.extension());

    Ok(attachment(&report, format, &format!("report-{}-{}", kind.name(), date))?)
}

#[instrument(skip(state))]
pub async fn export_analytics(
    State(state): State<ReportState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let format = ExportFormat::parse(query.format.as_deref())?;
    let date = resolve_date(&query)?;

    let summary = AnalyticsService::new(&state.config).summary(date).await?;
    info!("Exporting analytics for {} as {}", date, format.extension());

    Ok(attachment(&summary, format, &format!("analytics-{}", date))?)
}
