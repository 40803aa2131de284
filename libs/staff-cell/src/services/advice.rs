use analytics_cell::services::metrics::{self, round_to};
use analytics_cell::PeriodData;
use shared_models::clinic::Employee;
use uuid::Uuid;

use crate::models::EmployeeAdvice;

const SATISFACTION_FLOOR: f64 = 95.0;
const PATIENT_FLOOR: usize = 45;

pub const UPSELL_ADVICE: &str = "Focus on upselling premium add-ons and improving patient retention.";
pub const FEEDBACK_ADVICE: &str = "Consider requesting more patient feedback and reviewing session quality.";
pub const OUTREACH_ADVICE: &str = "Increase outreach to returning clients and follow up on missed appointments.";
pub const PRAISE: &str = "Excellent performance! Keep up the great work.";

pub fn advice_lines(revenue: f64, target: f64, satisfaction: f64, patients: usize) -> Vec<String> {
    let mut advice = Vec::new();
    if revenue < target {
        advice.push(UPSELL_ADVICE.to_string());
    }
    if satisfaction < SATISFACTION_FLOOR {
        advice.push(FEEDBACK_ADVICE.to_string());
    }
    if patients < PATIENT_FLOOR {
        advice.push(OUTREACH_ADVICE.to_string());
    }
    if advice.is_empty() {
        advice.push(PRAISE.to_string());
    }
    advice
}

/// What one employee delivered over a loaded period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scorecard {
    pub patients: usize,
    pub revenue: f64,
    pub satisfaction: f64,
    pub sessions: usize,
}

pub fn scorecard(employee_id: Uuid, data: &PeriodData) -> Scorecard {
    let completed: Vec<_> = data
        .appointments_for(employee_id)
        .into_iter()
        .filter(|apt| apt.is_completed())
        .collect();

    Scorecard {
        patients: metrics::unique_clients(&completed).len(),
        revenue: round_to(metrics::revenue(&completed), 2),
        satisfaction: metrics::satisfaction_percent(&data.feedback_for(employee_id))
            .or_else(|| metrics::performance_satisfaction(&data.performance_for(employee_id)))
            .unwrap_or(0.0),
        sessions: completed.len(),
    }
}

pub fn employee_advice(employee: &Employee, data: &PeriodData, target: f64) -> EmployeeAdvice {
    let card = scorecard(employee.id, data);

    EmployeeAdvice {
        employee_id: employee.id,
        name: employee.full_name.clone(),
        role: employee.role.display_name().to_string(),
        from: data.from,
        to: data.to,
        patients: card.patients,
        revenue: card.revenue,
        satisfaction: card.satisfaction,
        sessions: card.sessions,
        target,
        advice: advice_lines(card.revenue, target, card.satisfaction, card.patients),
    }
}
