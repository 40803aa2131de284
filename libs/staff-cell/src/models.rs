// =====================================================================================
// STAFF MODELS
// =====================================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use analytics_cell::AnalyticsError;
use shared_models::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeListing {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub email: String,
    pub specializations: Vec<String>,
    pub is_active: bool,
    pub target: f64,
}

// =====================================================================================
// TARGETS
// =====================================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TargetRequest {
    pub target: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetResponse {
    pub employee_id: Uuid,
    pub target: f64,
    pub message: String,
}

// =====================================================================================
// ADVICE
// =====================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeAdvice {
    pub employee_id: Uuid,
    pub name: String,
    pub role: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub patients: usize,
    pub revenue: f64,
    pub satisfaction: f64,
    pub sessions: usize,
    pub target: f64,
    pub advice: Vec<String>,
}

// =====================================================================================
// COMPENSATION
// =====================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeCompensation {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub revenue: f64,
    pub salary: f64,
    pub commission: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompensationReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub employees: Vec<EmployeeCompensation>,
    pub total_revenue: f64,
    pub total_salary: f64,
    pub total_commission: f64,
    pub total_compensation: f64,
}

// =====================================================================================
// ERRORS
// =====================================================================================

#[derive(Debug, Error)]
pub enum StaffError {
    #[error("Target must be greater than zero")]
    InvalidTarget,

    #[error(transparent)]
    Range(#[from] AnalyticsError),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<StaffError> for AppError {
    fn from(err: StaffError) -> Self {
        match err {
            StaffError::InvalidTarget => AppError::ValidationError(err.to_string()),
            StaffError::Range(inner) => inner.into(),
            StaffError::Store(inner) => inner,
        }
    }
}

/// Whole dollars get thousands separators; cents are kept only when present.
pub fn format_amount(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let (whole, fraction) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    match fraction {
        0 => format!("{}{}", sign, grouped),
        f if f % 10 == 0 => format!("{}{}.{}", sign, grouped, f / 10),
        f => format!("{}{}.{:02}", sign, grouped, f),
    }
}
