// =====================================================================================
// REPORT MODELS
// =====================================================================================

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use analytics_cell::models::{DashboardAlert, TopPerformer};
use analytics_cell::AnalyticsError;
use shared_models::error::AppError;

// =====================================================================================
// QUERIES
// =====================================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Daily,
    Weekly,
}

impl ReportKind {
    pub fn parse(raw: Option<&str>) -> Result<Self, ReportError> {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("daily") => Ok(ReportKind::Daily),
            Some("weekly") => Ok(ReportKind::Weekly),
            _ => Err(ReportError::UnknownType),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::Daily => "daily",
            ReportKind::Weekly => "weekly",
        }
    }
}

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// CSV unless the caller asks otherwise.
    pub fn parse(raw: Option<&str>) -> Result<Self, ReportError> {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            None | Some("") | Some("csv") => Ok(ExportFormat::Csv),
            Some("json") => Ok(ExportFormat::Json),
            Some(other) => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

// =====================================================================================
// DAILY REPORT
// =====================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialPulse {
    pub revenue: f64,
    pub revenue_change_pct: f64,
    pub revenue_target: f64,
    pub ebita: f64,
    pub ebita_change_pct: f64,
    pub ebita_target: f64,
    pub profit_margin: f64,
    pub industry_avg_margin: f64,
    pub cash_collected: f64,
    pub collection_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomDay {
    pub name: String,
    pub utilization: f64,
    pub sessions: usize,
    pub idle_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationalEfficiency {
    pub room_utilization: f64,
    pub rooms: Vec<RoomDay>,
    pub patients_seen: usize,
    pub walk_ins: usize,
    pub pre_booked: usize,
    pub avg_session_value: f64,
    pub avg_session_value_change: f64,
    pub no_show_rate: f64,
    pub no_show_target: f64,
}

/// One employee's line on a report card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StaffLine {
    pub name: String,
    pub role: String,
    pub patients: usize,
    pub revenue: f64,
    pub satisfaction: f64,
    pub sessions: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below_target: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub financial_pulse: FinancialPulse,
    pub operational_efficiency: OperationalEfficiency,
    pub employees: Vec<StaffLine>,
    pub top_performer: Option<TopPerformer>,
    pub alerts: Vec<DashboardAlert>,
    pub ai_suggestion: Option<String>,
}

// =====================================================================================
// WEEKLY REPORT
// =====================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomWeek {
    pub name: String,
    pub utilization: f64,
    pub sessions: usize,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialDashboard {
    pub total_revenue: f64,
    pub revenue_wow_pct: f64,
    pub revenue_breakdown: BTreeMap<String, f64>,
    pub ebita: f64,
    pub profit_margin: f64,
    pub per_room_revenue: f64,
    pub per_room_revenue_change: f64,
    pub cash_collected: f64,
    pub cash_collection_rate: f64,
    pub outstanding_ar: f64,
    pub ar_30days_pct: f64,
    pub refunds_issued: f64,
    pub refunds_pct: f64,
    pub room_details: Vec<RoomWeek>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationalMetrics {
    pub room_utilization_heatmap: Vec<Vec<f64>>,
    pub room_utilization_labels: Vec<String>,
    pub days: Vec<String>,
    pub total_patients: usize,
    pub new_patients: usize,
    pub returning_patients: usize,
    pub avg_wait_time: f64,
    pub treatment_completion: f64,
    pub dropped_out: usize,
    pub staff_productivity: Vec<StaffLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictiveCashFlow {
    pub next_week_revenue: f64,
    pub fixed_costs: f64,
    pub variable_costs: f64,
    pub projected_cash_surplus: f64,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquipmentRoi {
    pub name: String,
    pub cost: f64,
    pub sessions: usize,
    pub revenue_generated: f64,
    pub roi_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PowerTools {
    pub predictive_cash_flow: PredictiveCashFlow,
    pub equipment_roi: Vec<EquipmentRoi>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyReport {
    pub date: NaiveDate,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub financial_dashboard: FinancialDashboard,
    pub operational_metrics: OperationalMetrics,
    pub power_tools: PowerTools,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Report {
    Daily(DailyReport),
    Weekly(WeeklyReport),
}

// =====================================================================================
// ERRORS
// =====================================================================================

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Unknown report type")]
    UnknownType,

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Query(#[from] AnalyticsError),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::UnknownType | ReportError::UnknownFormat(_) => AppError::BadRequest(err.to_string()),
            ReportError::Export(msg) => AppError::Internal(msg),
            ReportError::Query(inner) => inner.into(),
            ReportError::Store(inner) => inner,
        }
    }
}
