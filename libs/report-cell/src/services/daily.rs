use chrono::NaiveDate;

use analytics_cell::models::AlertKind;
use analytics_cell::services::dashboard::build_dashboard;
use analytics_cell::services::metrics::{self, clinic_window, round_to};
use analytics_cell::PeriodData;
use shared_config::{SchedulingSettings, TargetSettings};
use shared_models::clinic::Appointment;

use crate::models::{DailyReport, FinancialPulse, OperationalEfficiency, RoomDay};
use crate::services::cards::{room_sessions, staff_lines};

/// The daily report card: the dashboard numbers plus per-room idle time and
/// the employee table.
pub fn build_daily_report(
    date: NaiveDate,
    today: &PeriodData,
    yesterday: &PeriodData,
    tomorrow: &[Appointment],
    settings: &SchedulingSettings,
    targets: &TargetSettings,
) -> DailyReport {
    let dashboard = build_dashboard(date, today, yesterday, tomorrow, settings, targets);

    let (open, close) = clinic_window(date, settings);
    let open_hours = settings.open_minutes_per_day() as f64 / 60.0;
    let rooms = today
        .rooms
        .iter()
        .filter(|room| room.is_available())
        .map(|room| {
            let booked_hours = metrics::booked_minutes(room.id, &today.appointments, open, close) as f64 / 60.0;
            RoomDay {
                name: room.room_name.clone(),
                utilization: metrics::room_utilization(room.id, &today.appointments, &[date], settings),
                sessions: room_sessions(room, today),
                idle_hours: round_to((open_hours - booked_hours).max(0.0), 1),
            }
        })
        .collect();

    let ai_suggestion = dashboard
        .alerts
        .iter()
        .find(|alert| alert.kind == AlertKind::Suggestion)
        .map(|alert| alert.message.clone());

    DailyReport {
        date,
        financial_pulse: FinancialPulse {
            revenue: dashboard.daily_revenue.value,
            revenue_change_pct: dashboard.daily_revenue.change,
            revenue_target: dashboard.daily_revenue.target,
            ebita: dashboard.ebita.value,
            ebita_change_pct: dashboard.ebita.change,
            ebita_target: dashboard.ebita.target,
            profit_margin: dashboard.profit_margin,
            industry_avg_margin: targets.industry_avg_margin,
            cash_collected: dashboard.cash_collected.value,
            collection_rate: dashboard.cash_collected.rate,
        },
        operational_efficiency: OperationalEfficiency {
            room_utilization: dashboard.room_utilization.overall,
            rooms,
            patients_seen: dashboard.patients_seen.total,
            walk_ins: dashboard.patients_seen.walk_ins,
            pre_booked: dashboard.patients_seen.pre_booked,
            avg_session_value: dashboard.avg_session_value.value,
            avg_session_value_change: dashboard.avg_session_value.change,
            no_show_rate: dashboard.no_show_rate,
            no_show_target: targets.no_show_rate,
        },
        employees: staff_lines(today, |_| None),
        top_performer: dashboard.top_performer,
        alerts: dashboard.alerts,
        ai_suggestion,
    }
}
