use std::collections::HashMap;

use uuid::Uuid;

use analytics_cell::services::metrics::round_to;
use analytics_cell::PeriodData;
use shared_models::clinic::EmployeeRole;

use crate::models::{CompensationReport, EmployeeCompensation};

/// Juniors are paid a fixed salary and earn no commission; everyone else
/// earns commission on revenue and no salary.
pub fn calculate_salary_and_commission(
    role: EmployeeRole,
    revenue: f64,
    fixed_salary: f64,
    commission_rate: f64,
) -> (f64, f64) {
    if role.is_junior() {
        (fixed_salary, 0.0)
    } else {
        (0.0, revenue * commission_rate)
    }
}

pub fn compensation_report(data: &PeriodData) -> CompensationReport {
    let mut revenue_by_employee: HashMap<Uuid, f64> = HashMap::new();
    for apt in data.appointments.iter().filter(|apt| apt.is_completed()) {
        *revenue_by_employee.entry(apt.employee_id).or_default() += apt.final_price;
    }

    let mut employees: Vec<EmployeeCompensation> = data
        .employees
        .iter()
        .filter(|e| e.is_active())
        .map(|employee| {
            let revenue = revenue_by_employee.get(&employee.id).copied().unwrap_or(0.0);
            let (salary, commission) = calculate_salary_and_commission(
                employee.role,
                revenue,
                employee.base_salary.unwrap_or(0.0),
                employee.commission_rate.unwrap_or(0.0),
            );
            EmployeeCompensation {
                id: employee.id,
                name: employee.full_name.clone(),
                role: employee.role.display_name().to_string(),
                revenue: round_to(revenue, 2),
                salary: round_to(salary, 2),
                commission: round_to(commission, 2),
                total: round_to(salary + commission, 2),
            }
        })
        .collect();
    employees.sort_by(|a, b| b.revenue.total_cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));

    let total = |pick: fn(&EmployeeCompensation) -> f64| round_to(employees.iter().map(pick).sum(), 2);
    CompensationReport {
        from: data.from,
        to: data.to,
        total_revenue: total(|e| e.revenue),
        total_salary: total(|e| e.salary),
        total_commission: total(|e| e.commission),
        total_compensation: total(|e| e.total),
        employees,
    }
}
