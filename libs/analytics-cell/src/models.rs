// =====================================================================================
// ANALYTICS MODELS
// =====================================================================================

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

// =====================================================================================
// QUERIES
// =====================================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Ranges default to the 30 days ending today.
pub const DEFAULT_RANGE_DAYS: i64 = 30;

/// Years outside this range are rejected so day arithmetic cannot overflow.
pub const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

pub fn parse_date(raw: Option<&str>, default: NaiveDate) -> Result<NaiveDate, AnalyticsError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .filter(|date| SUPPORTED_YEARS.contains(&date.year()))
            .ok_or_else(|| AnalyticsError::InvalidDate(value.to_string())),
    }
}

impl DateQuery {
    pub fn resolve(&self) -> Result<NaiveDate, AnalyticsError> {
        parse_date(self.date.as_deref(), Utc::now().date_naive())
    }
}

impl RangeQuery {
    pub fn resolve(&self) -> Result<(NaiveDate, NaiveDate), AnalyticsError> {
        self.resolve_days(DEFAULT_RANGE_DAYS)
    }

    /// Like [`RangeQuery::resolve`], with a missing `from` falling back to
    /// `days` days ending at `to`.
    pub fn resolve_days(&self, days: i64) -> Result<(NaiveDate, NaiveDate), AnalyticsError> {
        let to = parse_date(self.to.as_deref(), Utc::now().date_naive())?;
        let from = parse_date(self.from.as_deref(), to - Duration::days(days - 1))?;
        if from > to {
            return Err(AnalyticsError::InvalidRange { from, to });
        }
        Ok((from, to))
    }
}

// =====================================================================================
// ERRORS
// =====================================================================================

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Store(inner) => inner,
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

// =====================================================================================
// DASHBOARD
// =====================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetedValue {
    pub value: f64,
    pub change: f64,
    pub target: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashCollected {
    pub value: f64,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomRate {
    pub id: Uuid,
    pub name: String,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomUtilizationSummary {
    pub overall: f64,
    pub rooms: Vec<RoomRate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientsSeen {
    pub total: usize,
    pub walk_ins: usize,
    pub pre_booked: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValueChange {
    pub value: f64,
    pub change: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopPerformer {
    pub id: Uuid,
    pub name: String,
    pub satisfaction: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Warning,
    Suggestion,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardAlert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub date: NaiveDate,
    pub daily_revenue: TargetedValue,
    pub ebita: TargetedValue,
    pub profit_margin: f64,
    pub cash_collected: CashCollected,
    pub room_utilization: RoomUtilizationSummary,
    pub patients_seen: PatientsSeen,
    pub avg_session_value: ValueChange,
    pub no_show_rate: f64,
    pub top_performer: Option<TopPerformer>,
    pub alerts: Vec<DashboardAlert>,
}

// =====================================================================================
// DAILY SUMMARY
// =====================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub revenue: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub date: NaiveDate,
    pub revenue: f64,
    pub profit: f64,
    pub retention: f64,
    pub unique_clients: usize,
    pub utilization: f64,
    pub trend: Vec<TrendPoint>,
}

// =====================================================================================
// FINANCIAL
// =====================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CashFlowPoint {
    pub month: String,
    pub inflow: f64,
    pub outflow: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyTrend {
    pub month: String,
    pub revenue: f64,
    pub profit: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub revenue: f64,
    pub profit: f64,
    pub expenses: f64,
    pub profit_margin: f64,
    pub ebitda: f64,
    pub cash_flow: Vec<CashFlowPoint>,
    pub revenue_by_service: Vec<NamedValue>,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub profit_trend: f64,
}

// =====================================================================================
// ROOMS
// =====================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomUsage {
    pub id: Uuid,
    pub name: String,
    pub utilization: f64,
    pub hours_used: f64,
    pub total_hours: f64,
    pub revenue: f64,
    pub appointments_count: usize,
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HourlyUtilization {
    pub hour: String,
    pub utilization: f64,
    pub appointments: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekdayTrend {
    pub day: String,
    pub utilization: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSuggestion {
    pub room: String,
    pub suggestion: String,
    pub potential_increase: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomPredictions {
    pub next_week_utilization: f64,
    pub optimization_suggestions: Vec<RoomSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub overall_utilization: f64,
    pub highly_utilized: usize,
    pub peak_hour: Option<String>,
    pub rooms: Vec<RoomUsage>,
    pub hourly_utilization: Vec<HourlyUtilization>,
    pub weekly_trends: Vec<WeekdayTrend>,
    pub predictions: RoomPredictions,
}

// =====================================================================================
// EMPLOYEES
// =====================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInsight {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub hours_worked: f64,
    pub revenue: f64,
    pub appointments: usize,
    pub rating: f64,
    pub retention: f64,
    pub compensation: f64,
    pub efficiency: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RolePerformance {
    pub role: String,
    pub avg_revenue: f64,
    pub avg_rating: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPerformance {
    pub month: String,
    pub total_revenue: f64,
    pub avg_satisfaction: f64,
    pub hours_worked: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleRetention {
    pub role: String,
    pub retention: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetentionMetrics {
    pub overall: f64,
    pub by_role: Vec<RoleRetention>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_employees: usize,
    pub average_rating: f64,
    pub total_compensation: f64,
    pub employees: Vec<EmployeeInsight>,
    pub top_performers: Vec<EmployeeInsight>,
    pub performance_by_role: Vec<RolePerformance>,
    pub monthly_performance: Vec<MonthlyPerformance>,
    pub retention_metrics: RetentionMetrics,
}

// =====================================================================================
// OPTIMIZATION
// =====================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationKpis {
    pub client_retention: f64,
    pub appointment_utilization: f64,
    pub revenue_per_client: f64,
    pub profit_margin: f64,
    pub employee_efficiency: f64,
    pub market_growth: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub category: String,
    pub description: String,
    pub impact: Level,
    pub effort: Level,
    pub potential_revenue: f64,
    pub priority: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskFactor {
    pub factor: String,
    pub severity: Level,
    pub probability: Level,
    pub impact: String,
    pub mitigation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub title: String,
    pub deadline: NaiveDate,
    pub priority: Level,
    pub owner: String,
    pub estimated_impact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub kpis: OptimizationKpis,
    pub opportunities: Vec<Opportunity>,
    pub risk_factors: Vec<RiskFactor>,
    pub conversion_funnel: Vec<NamedValue>,
    pub action_items: Vec<ActionItem>,
}
