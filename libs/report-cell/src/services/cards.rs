use uuid::Uuid;

use analytics_cell::PeriodData;
use shared_models::clinic::Room;
use staff_cell::services::advice::scorecard;

use crate::models::StaffLine;

/// Report lines for every active employee with at least one booking in the
/// period, highest revenue first. `target_for` returning `Some` adds the
/// below-target flag.
pub fn staff_lines(data: &PeriodData, target_for: impl Fn(Uuid) -> Option<f64>) -> Vec<StaffLine> {
    let mut lines: Vec<StaffLine> = data
        .employees
        .iter()
        .filter(|e| e.is_active() && data.appointments.iter().any(|apt| apt.employee_id == e.id))
        .map(|employee| {
            let card = scorecard(employee.id, data);
            StaffLine {
                name: employee.full_name.clone(),
                role: employee.role.display_name().to_string(),
                patients: card.patients,
                revenue: card.revenue,
                satisfaction: card.satisfaction,
                sessions: card.sessions,
                below_target: target_for(employee.id).map(|target| card.revenue < target),
            }
        })
        .collect();

    lines.sort_by(|a, b| b.revenue.total_cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));
    lines
}

/// Active bookings held by one room.
pub fn room_sessions(room: &Room, data: &PeriodData) -> usize {
    data.appointments
        .iter()
        .filter(|apt| apt.is_active() && apt.room_id == Some(room.id))
        .count()
}

pub fn room_revenue(room: &Room, data: &PeriodData) -> f64 {
    data.appointments
        .iter()
        .filter(|apt| apt.is_completed() && apt.room_id == Some(room.id))
        .map(|apt| apt.final_price)
        .sum()
}
