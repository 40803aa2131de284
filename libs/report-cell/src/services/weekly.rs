use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use uuid::Uuid;

use analytics_cell::services::metrics::{self, day_start, round_to};
use analytics_cell::PeriodData;
use shared_config::SchedulingSettings;
use shared_models::clinic::{Appointment, AppointmentStatus, TransactionKind};
use staff_cell::format_amount;

use crate::models::{
    EquipmentRoi, FinancialDashboard, OperationalMetrics, PowerTools, PredictiveCashFlow, RoomWeek,
    WeeklyReport,
};
use crate::services::cards::{room_revenue, room_sessions, staff_lines};

pub const HEATMAP_LABELS: [&str; 5] = ["8-10am", "10-12", "12-2pm", "2-4pm", "4-6pm"];
pub const HEATMAP_DAYS: [&str; 6] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const HEATMAP_FIRST_HOUR: i64 = 8;
const BAND_HOURS: i64 = 2;
const AR_AGE_DAYS: i64 = 30;

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Everything the weekly card needs besides the week itself.
pub struct WeekContext<'a> {
    pub previous: &'a PeriodData,
    pub next_week: &'a [Appointment],
    /// Appointments up to the week end that may still be unpaid.
    pub receivables: &'a [Appointment],
    pub settings: &'a SchedulingSettings,
}

pub fn build_weekly_report(
    date: NaiveDate,
    week: &PeriodData,
    ctx: &WeekContext<'_>,
    target_for: impl Fn(Uuid) -> f64,
) -> WeeklyReport {
    let revenue = metrics::revenue(&week.appointments);

    WeeklyReport {
        date,
        week_start: week.from,
        week_end: week.to,
        financial_dashboard: financial_dashboard(week, ctx, revenue),
        operational_metrics: operational_metrics(week, target_for),
        power_tools: PowerTools {
            predictive_cash_flow: predictive_cash_flow(week, ctx.next_week, revenue),
            equipment_roi: equipment_roi(week),
        },
    }
}

fn per_room(revenue: f64, data: &PeriodData) -> f64 {
    let rooms = data.rooms.iter().filter(|room| room.is_available()).count();
    if rooms == 0 {
        0.0
    } else {
        revenue / rooms as f64
    }
}

fn financial_dashboard(week: &PeriodData, ctx: &WeekContext<'_>, revenue: f64) -> FinancialDashboard {
    let previous_revenue = metrics::revenue(&ctx.previous.appointments);
    let ebita = metrics::ebita(revenue, metrics::expenses(&week.transactions, &week.performance));
    let cash = metrics::cash_collected(&week.transactions);
    let refunds = metrics::refunds(&week.transactions);

    let week_close = day_start(week.to) + Duration::days(1);
    let aged_cutoff = week_close - Duration::days(AR_AGE_DAYS);
    let outstanding = metrics::outstanding_amount(ctx.receivables);
    let aged: Vec<Appointment> = ctx
        .receivables
        .iter()
        .filter(|apt| apt.scheduled_start < aged_cutoff)
        .cloned()
        .collect();

    let room_details = week
        .rooms
        .iter()
        .filter(|room| room.is_available())
        .map(|room| RoomWeek {
            name: room.room_name.clone(),
            utilization: metrics::room_utilization(room.id, &week.appointments, &week.dates(), ctx.settings),
            sessions: room_sessions(room, week),
            revenue: round_to(room_revenue(room, week), 2),
        })
        .collect();

    let this_room = per_room(revenue, week);
    let last_room = per_room(previous_revenue, ctx.previous);

    FinancialDashboard {
        total_revenue: round_to(revenue, 2),
        revenue_wow_pct: metrics::percent_change(revenue, previous_revenue),
        revenue_breakdown: metrics::revenue_by_type(&week.appointments)
            .into_iter()
            .map(|(name, value)| (name, round_to(value, 2)))
            .collect::<BTreeMap<_, _>>(),
        ebita: round_to(ebita, 2),
        profit_margin: metrics::profit_margin(ebita, revenue),
        per_room_revenue: round_to(this_room, 2),
        per_room_revenue_change: round_to(this_room - last_room, 2),
        cash_collected: round_to(cash, 2),
        cash_collection_rate: metrics::share_percent(cash, revenue),
        outstanding_ar: round_to(outstanding, 2),
        ar_30days_pct: metrics::share_percent(metrics::outstanding_amount(&aged), outstanding),
        refunds_issued: round_to(refunds, 2),
        refunds_pct: if revenue == 0.0 { 0.0 } else { round_to(refunds / revenue * 100.0, 1) },
        room_details,
    }
}

/// Rows are two-hour bands from 08:00, columns Monday to Saturday.
pub fn utilization_heatmap(week: &PeriodData) -> Vec<Vec<f64>> {
    (0..HEATMAP_LABELS.len() as i64)
        .map(|band| {
            (0..HEATMAP_DAYS.len() as i64)
                .map(|offset| {
                    let from: DateTime<Utc> = day_start(week.from + Duration::days(offset))
                        + Duration::hours(HEATMAP_FIRST_HOUR + band * BAND_HOURS);
                    metrics::window_utilization(&week.rooms, &week.appointments, from, from + Duration::hours(BAND_HOURS))
                })
                .collect()
        })
        .collect()
}

/// Mean minutes between the booked and actual start of completed sessions.
pub fn average_wait_minutes(appointments: &[Appointment]) -> f64 {
    let waits: Vec<i64> = appointments
        .iter()
        .filter(|apt| apt.is_completed())
        .filter_map(|apt| apt.actual_start.map(|actual| (actual - apt.scheduled_start).num_minutes().max(0)))
        .collect();
    if waits.is_empty() {
        0.0
    } else {
        round_to(waits.iter().sum::<i64>() as f64 / waits.len() as f64, 1)
    }
}

fn operational_metrics(week: &PeriodData, target_for: impl Fn(Uuid) -> f64) -> OperationalMetrics {
    let seen = metrics::unique_clients(&week.appointments);
    let returning = metrics::returning_clients(&seen, &week.clients, week.from);

    let completed = week.appointments.iter().filter(|apt| apt.is_completed()).count();
    let dropped_out = week
        .appointments
        .iter()
        .filter(|apt| matches!(apt.status(), AppointmentStatus::Cancelled | AppointmentStatus::NoShow))
        .count();

    OperationalMetrics {
        room_utilization_heatmap: utilization_heatmap(week),
        room_utilization_labels: HEATMAP_LABELS.iter().map(|s| s.to_string()).collect(),
        days: HEATMAP_DAYS.iter().map(|s| s.to_string()).collect(),
        total_patients: seen.len(),
        new_patients: seen.len() - returning,
        returning_patients: returning,
        avg_wait_time: average_wait_minutes(&week.appointments),
        treatment_completion: metrics::share_percent(completed as f64, (completed + dropped_out) as f64),
        dropped_out,
        staff_productivity: staff_lines(week, |id| Some(target_for(id))),
    }
}

fn predictive_cash_flow(week: &PeriodData, next_week: &[Appointment], revenue: f64) -> PredictiveCashFlow {
    let booked: Vec<&Appointment> = next_week
        .iter()
        .filter(|apt| apt.status() == AppointmentStatus::Scheduled)
        .collect();
    let next_week_revenue = if booked.is_empty() {
        revenue
    } else {
        booked.iter().map(|apt| apt.final_price).sum()
    };

    let operating: f64 = week
        .transactions
        .iter()
        .filter(|tx| tx.kind() == TransactionKind::Expense)
        .map(|tx| tx.amount.abs())
        .sum();
    let salaries: f64 = week.performance.iter().filter_map(|row| row.salary_component).sum();
    let fixed_costs = operating + salaries;
    let variable_costs: f64 = week.performance.iter().filter_map(|row| row.commission_earned).sum();
    let surplus = next_week_revenue - fixed_costs - variable_costs;

    let recommendation = if surplus < 0.0 {
        format!(
            "Projected shortfall of ${} next week - chase outstanding invoices and fill open slots before Monday.",
            format_amount(-surplus)
        )
    } else {
        format!(
            "Projected surplus of ${} next week - keep the current booking pace.",
            format_amount(surplus)
        )
    };

    PredictiveCashFlow {
        next_week_revenue: round_to(next_week_revenue, 2),
        fixed_costs: round_to(fixed_costs, 2),
        variable_costs: round_to(variable_costs, 2),
        projected_cash_surplus: round_to(surplus, 2),
        recommendation,
    }
}

/// Maintenance cost against the revenue of the completed sessions each
/// machine was used in.
pub fn equipment_roi(week: &PeriodData) -> Vec<EquipmentRoi> {
    let mut by_name: BTreeMap<&str, (f64, usize, HashSet<Uuid>)> = BTreeMap::new();
    for usage in &week.equipment {
        let entry = by_name.entry(usage.equipment_name.as_str()).or_default();
        entry.0 += usage.maintenance_cost.unwrap_or(0.0);
        entry.1 += 1;
        entry.2.extend(usage.appointment_id);
    }

    let mut rows: Vec<EquipmentRoi> = by_name
        .into_iter()
        .map(|(name, (cost, sessions, appointment_ids))| {
            let revenue: f64 = week
                .appointments
                .iter()
                .filter(|apt| apt.is_completed() && appointment_ids.contains(&apt.id))
                .map(|apt| apt.final_price)
                .sum();
            EquipmentRoi {
                name: name.to_string(),
                cost: round_to(cost, 2),
                sessions,
                revenue_generated: round_to(revenue, 2),
                roi_pct: if cost > 0.0 { ((revenue - cost) / cost * 100.0).round() } else { 0.0 },
            }
        })
        .collect();
    rows.sort_by(|a, b| b.revenue_generated.total_cmp(&a.revenue_generated));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use shared_utils::test_utils::MockClinicRows;

    fn rows<T: serde::de::DeserializeOwned>(value: Value) -> Vec<T> {
        serde_json::from_value(value).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn fixture() -> PeriodData {
        let (sarah, gym, old, new) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut late = MockClinicRows::appointment(sarah, old, gym, "2025-03-03T08:00:00Z", "2025-03-03T10:00:00Z", "completed", 400.0);
        late["actual_start"] = json!("2025-03-03T08:10:00Z");
        let shockwave_session = late["id"].clone();
        let mut on_time = MockClinicRows::appointment(sarah, new, gym, "2025-03-05T14:00:00Z", "2025-03-05T15:00:00Z", "completed", 200.0);
        on_time["actual_start"] = json!("2025-03-05T13:55:00Z");
        let mut shockwave = MockClinicRows::equipment_usage(gym, "Shockwave", "2025-03-03T08:00:00Z", 100.0);
        shockwave["appointment_id"] = shockwave_session;

        PeriodData {
            from: monday(),
            to: monday() + Duration::days(6),
            appointments: rows(json!([
                late,
                on_time,
                MockClinicRows::appointment(sarah, new, gym, "2025-03-06T09:00:00Z", "2025-03-06T10:00:00Z", "no_show", 200.0),
            ])),
            transactions: rows(json!([
                MockClinicRows::transaction(500.0, "payment", "2025-03-03T10:00:00Z"),
                MockClinicRows::transaction(60.0, "refund", "2025-03-04T10:00:00Z"),
            ])),
            equipment: rows(json!([shockwave])),
            rooms: rows(json!([MockClinicRows::room(gym, "Gym Area")])),
            employees: rows(json!([MockClinicRows::employee(sarah, "Sarah Chen", "partner", &["physiotherapy"])])),
            clients: rows(json!([
                MockClinicRows::client(old, "Old Friend", "2024-05-01"),
                MockClinicRows::client(new, "New Face", "2025-03-05"),
            ])),
            ..PeriodData::default()
        }
    }

    #[test]
    fn week_starts_on_monday() {
        let thursday = NaiveDate::from_ymd_opt(2025, 3, 6).unwrap();
        assert_eq!(week_start(thursday), monday());
        assert_eq!(week_start(monday()), monday());
        assert_eq!(week_start(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()), monday());
    }

    #[test]
    fn heatmap_is_five_bands_by_six_days() {
        let heatmap = utilization_heatmap(&fixture());

        assert_eq!(heatmap.len(), 5);
        assert!(heatmap.iter().all(|row| row.len() == 6));
        assert_eq!(heatmap[0][0], 100.0);
        assert_eq!(heatmap[3][2], 50.0);
        assert_eq!(heatmap[1][0], 0.0);
    }

    #[test]
    fn wait_time_ignores_early_starts() {
        assert_eq!(average_wait_minutes(&fixture().appointments), 5.0);
    }

    #[test]
    fn weekly_card_numbers() {
        let week = fixture();
        let previous = PeriodData::default();
        let ctx = WeekContext {
            previous: &previous,
            next_week: &[],
            receivables: &[],
            settings: &SchedulingSettings::default(),
        };

        let report = build_weekly_report(monday(), &week, &ctx, |_| 9000.0);
        let money = &report.financial_dashboard;
        let ops = &report.operational_metrics;

        assert_eq!(money.total_revenue, 600.0);
        assert_eq!(money.revenue_breakdown.get("Physio"), Some(&600.0));
        assert_eq!(money.refunds_issued, 60.0);
        assert_eq!(money.refunds_pct, 10.0);
        assert_eq!(money.cash_collection_rate, 73.0);
        assert_eq!(ops.total_patients, 2);
        assert_eq!(ops.returning_patients, 1);
        assert_eq!(ops.new_patients, 1);
        assert_eq!(ops.dropped_out, 1);
        assert_eq!(ops.treatment_completion, 67.0);
        assert_eq!(ops.staff_productivity[0].below_target, Some(true));
        assert_eq!(report.power_tools.predictive_cash_flow.next_week_revenue, 600.0);
        assert_eq!(report.power_tools.equipment_roi[0].revenue_generated, 400.0);
        assert_eq!(report.power_tools.equipment_roi[0].roi_pct, 300.0);
    }
}
