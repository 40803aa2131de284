//! Business formulas shared by the dashboards and reports. Everything here is
//! pure over already-loaded rows.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use shared_config::SchedulingSettings;
use shared_models::clinic::{
    Appointment, AppointmentStatus, Client, ClientFeedback, EmployeePerformance,
    FinancialTransaction, Room, TransactionKind,
};

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub fn clinic_window(date: NaiveDate, settings: &SchedulingSettings) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = day_start(date);
    (
        day + Duration::hours(settings.open_hour as i64),
        day + Duration::hours(settings.close_hour as i64),
    )
}

/// Every date from `from` to `to`, both included.
pub fn days_in(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|d| *d <= to).collect()
}

// ---------------------------------------------------------------------------
// money
// ---------------------------------------------------------------------------

pub fn revenue(appointments: &[Appointment]) -> f64 {
    appointments
        .iter()
        .filter(|apt| apt.is_completed())
        .map(|apt| apt.final_price)
        .sum()
}

/// Operating transactions plus staff cost.
pub fn expenses(transactions: &[FinancialTransaction], performance: &[EmployeePerformance]) -> f64 {
    let operating: f64 = transactions
        .iter()
        .filter(|tx| tx.kind() == TransactionKind::Expense)
        .map(|tx| tx.amount.abs())
        .sum();
    operating + staff_cost(performance)
}

pub fn staff_cost(performance: &[EmployeePerformance]) -> f64 {
    performance
        .iter()
        .map(|row| row.salary_component.unwrap_or(0.0) + row.commission_earned.unwrap_or(0.0))
        .sum()
}

pub fn ebita(revenue: f64, expenses: f64) -> f64 {
    revenue - expenses
}

/// Whole percent, 0 without revenue.
pub fn profit_margin(ebita: f64, revenue: f64) -> f64 {
    if revenue == 0.0 {
        0.0
    } else {
        (ebita / revenue * 100.0).round()
    }
}

pub fn cash_collected(transactions: &[FinancialTransaction]) -> f64 {
    transactions
        .iter()
        .map(|tx| match tx.kind() {
            TransactionKind::Payment => tx.amount.abs(),
            TransactionKind::Refund => -tx.amount.abs(),
            TransactionKind::Expense => 0.0,
        })
        .sum()
}

pub fn refunds(transactions: &[FinancialTransaction]) -> f64 {
    transactions
        .iter()
        .filter(|tx| tx.kind() == TransactionKind::Refund)
        .map(|tx| tx.amount.abs())
        .sum()
}

pub fn share_percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        (part / whole * 100.0).round()
    }
}

/// Rounded percent change, 0 when there is nothing to compare against.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        0.0
    } else {
        ((current - previous) / previous.abs() * 100.0).round()
    }
}

pub fn average_session_value(appointments: &[Appointment]) -> f64 {
    let completed = appointments.iter().filter(|apt| apt.is_completed()).count();
    if completed == 0 {
        0.0
    } else {
        round_to(revenue(appointments) / completed as f64, 2)
    }
}

pub fn outstanding_amount(appointments: &[Appointment]) -> f64 {
    appointments
        .iter()
        .filter(|apt| apt.is_outstanding() && apt.status() != AppointmentStatus::Cancelled)
        .map(|apt| apt.final_price)
        .sum()
}

pub fn revenue_by_type(appointments: &[Appointment]) -> Vec<(String, f64)> {
    let mut totals: HashMap<&'static str, f64> = HashMap::new();
    for apt in appointments.iter().filter(|apt| apt.is_completed()) {
        *totals.entry(apt.appointment_type.label()).or_default() += apt.final_price;
    }
    let mut rows: Vec<(String, f64)> = totals.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

// ---------------------------------------------------------------------------
// patients
// ---------------------------------------------------------------------------

/// (walk-ins, pre-booked) over completed appointments.
pub fn walk_in_split(appointments: &[Appointment]) -> (usize, usize) {
    let completed: Vec<&Appointment> = appointments.iter().filter(|apt| apt.is_completed()).collect();
    let walk_ins = completed.iter().filter(|apt| apt.is_walk_in()).count();
    (walk_ins, completed.len() - walk_ins)
}

/// Percent with one decimal.
pub fn no_show_rate(appointments: &[Appointment]) -> f64 {
    if appointments.is_empty() {
        return 0.0;
    }
    let no_shows = appointments
        .iter()
        .filter(|apt| apt.status() == AppointmentStatus::NoShow)
        .count();
    round_to(no_shows as f64 / appointments.len() as f64 * 100.0, 1)
}

pub fn unique_clients(appointments: &[Appointment]) -> HashSet<Uuid> {
    appointments
        .iter()
        .filter(|apt| apt.is_active())
        .map(|apt| apt.client_id)
        .collect()
}

/// Clients in `seen` whose first visit predates `range_start`.
pub fn returning_clients(seen: &HashSet<Uuid>, clients: &[Client], range_start: NaiveDate) -> usize {
    clients
        .iter()
        .filter(|client| seen.contains(&client.id))
        .filter(|client| client.first_visit_date.map_or(false, |first| first < range_start))
        .count()
}

pub fn retention(appointments: &[Appointment], clients: &[Client], range_start: NaiveDate) -> f64 {
    let seen = unique_clients(appointments);
    if seen.is_empty() {
        return 0.0;
    }
    share_percent(returning_clients(&seen, clients, range_start) as f64, seen.len() as f64)
}

/// Average rating scaled to a percentage (5 stars = 100).
pub fn satisfaction_percent(feedback: &[&ClientFeedback]) -> Option<f64> {
    let ratings: Vec<i32> = feedback.iter().filter_map(|f| f.rating).collect();
    if ratings.is_empty() {
        None
    } else {
        Some(round_to(ratings.iter().sum::<i32>() as f64 / ratings.len() as f64 * 20.0, 1))
    }
}

/// Performance rows store satisfaction either out of 5 or as a percentage.
pub fn performance_satisfaction(rows: &[&EmployeePerformance]) -> Option<f64> {
    let values: Vec<f64> = rows.iter().filter_map(|row| row.client_satisfaction_avg).collect();
    if values.is_empty() {
        return None;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    Some(round_to(if avg <= 5.0 { avg * 20.0 } else { avg }, 1))
}

// ---------------------------------------------------------------------------
// rooms
// ---------------------------------------------------------------------------

pub fn booked_minutes(room_id: Uuid, appointments: &[Appointment], from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    appointments
        .iter()
        .filter(|apt| apt.is_active() && apt.room_id == Some(room_id))
        .map(|apt| apt.minutes_within(from, to))
        .sum()
}

/// Percent of one room's clinic hours that are booked over the dates.
pub fn room_utilization(
    room_id: Uuid,
    appointments: &[Appointment],
    dates: &[NaiveDate],
    settings: &SchedulingSettings,
) -> f64 {
    let open_minutes = settings.open_minutes_per_day() * dates.len() as i64;
    if open_minutes == 0 {
        return 0.0;
    }
    let booked: i64 = dates
        .iter()
        .map(|date| {
            let (open, close) = clinic_window(*date, settings);
            booked_minutes(room_id, appointments, open, close)
        })
        .sum();
    round_to(booked as f64 / open_minutes as f64 * 100.0, 1)
}

/// Booked share of all available rooms between `from` and `to`.
pub fn window_utilization(rooms: &[Room], appointments: &[Appointment], from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let available: Vec<&Room> = rooms.iter().filter(|room| room.is_available()).collect();
    let capacity = (to - from).num_minutes() * available.len() as i64;
    if capacity <= 0 {
        return 0.0;
    }
    let booked: i64 = available
        .iter()
        .map(|room| booked_minutes(room.id, appointments, from, to))
        .sum();
    round_to(booked as f64 / capacity as f64 * 100.0, 1)
}

pub fn overall_utilization(
    rooms: &[Room],
    appointments: &[Appointment],
    dates: &[NaiveDate],
    settings: &SchedulingSettings,
) -> f64 {
    let available: Vec<&Room> = rooms.iter().filter(|room| room.is_available()).collect();
    let capacity = settings.open_minutes_per_day() * dates.len() as i64 * available.len() as i64;
    if capacity == 0 {
        return 0.0;
    }
    let booked: i64 = dates
        .iter()
        .map(|date| {
            let (open, close) = clinic_window(*date, settings);
            available
                .iter()
                .map(|room| booked_minutes(room.id, appointments, open, close))
                .sum::<i64>()
        })
        .sum();
    round_to(booked as f64 / capacity as f64 * 100.0, 1)
}

pub fn utilization_level(rate: f64) -> &'static str {
    if rate >= 80.0 {
        "high"
    } else if rate >= 60.0 {
        "medium"
    } else {
        "low"
    }
}

/// Idle stretches of at least `min_gap` between consecutive bookings of one
/// room inside clinic hours.
pub fn idle_gaps(
    room_id: Uuid,
    appointments: &[Appointment],
    open: DateTime<Utc>,
    close: DateTime<Utc>,
    min_gap: Duration,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut bookings: Vec<(DateTime<Utc>, DateTime<Utc>)> = appointments
        .iter()
        .filter(|apt| apt.is_active() && apt.room_id == Some(room_id) && apt.overlaps(open, close))
        .map(|apt| (apt.scheduled_start.max(open), apt.scheduled_end.min(close)))
        .collect();
    bookings.sort();

    let mut gaps = Vec::new();
    let mut busy_until: Option<DateTime<Utc>> = None;
    for (start, end) in bookings {
        if let Some(previous_end) = busy_until {
            if start - previous_end >= min_gap {
                gaps.push((previous_end, start));
            }
        }
        busy_until = Some(busy_until.map_or(end, |b| b.max(end)));
    }
    gaps
}
