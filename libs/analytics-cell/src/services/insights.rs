//! Range reports behind the financial, room, employee and optimisation tabs.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Duration, NaiveDate, Timelike, Weekday};
use uuid::Uuid;

use shared_config::{SchedulingSettings, TargetSettings};
use shared_models::clinic::{Appointment, AppointmentStatus, PaymentStatus, TransactionKind};

use crate::models::{
    ActionItem, CashFlowPoint, EmployeeInsight, EmployeeReport, FinancialReport, HourlyUtilization,
    Level, MonthlyPerformance, MonthlyTrend, NamedValue, OptimizationKpis, OptimizationReport,
    Opportunity, RetentionMetrics, RiskFactor, RoleRetention, RolePerformance, RoomPredictions,
    RoomReport, RoomSuggestion, RoomUsage, WeekdayTrend,
};
use crate::services::dataset::PeriodData;
use crate::services::metrics::{self, day_start, round_to};

const UNDERUSED_ROOM: f64 = 60.0;
const BUSY_ROOM: f64 = 50.0;
const RETENTION_FLOOR: f64 = 70.0;
const TOP_PERFORMERS: usize = 5;

fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

fn months(data: &PeriodData) -> Vec<(String, PeriodData)> {
    let mut bounds: BTreeMap<String, (NaiveDate, NaiveDate)> = BTreeMap::new();
    for date in data.dates() {
        let entry = bounds.entry(month_key(date)).or_insert((date, date));
        entry.1 = date;
    }
    bounds
        .into_iter()
        .map(|(key, (from, to))| (key, data.slice(from, to)))
        .collect()
}

fn profit_of(data: &PeriodData) -> (f64, f64, f64) {
    let revenue = metrics::revenue(&data.appointments);
    let expenses = metrics::expenses(&data.transactions, &data.performance);
    (revenue, expenses, metrics::ebita(revenue, expenses))
}

// =====================================================================================
// FINANCIAL
// =====================================================================================

pub fn financial_report(data: &PeriodData) -> FinancialReport {
    let (revenue, expenses, profit) = profit_of(data);
    let maintenance: f64 = data.equipment.iter().filter_map(|usage| usage.maintenance_cost).sum();

    let per_month = months(data);
    let cash_flow = per_month
        .iter()
        .map(|(month, slice)| {
            let inflow: f64 = slice
                .transactions
                .iter()
                .filter(|tx| tx.kind() == TransactionKind::Payment)
                .map(|tx| tx.amount.abs())
                .sum();
            let outflow = metrics::expenses(&slice.transactions, &slice.performance) + metrics::refunds(&slice.transactions);
            CashFlowPoint {
                month: month.clone(),
                inflow: round_to(inflow, 2),
                outflow: round_to(outflow, 2),
                net: round_to(inflow - outflow, 2),
            }
        })
        .collect();

    let monthly_trends: Vec<MonthlyTrend> = per_month
        .iter()
        .map(|(month, slice)| {
            let (revenue, expenses, profit) = profit_of(slice);
            MonthlyTrend {
                month: month.clone(),
                revenue: round_to(revenue, 2),
                profit: round_to(profit, 2),
                expenses: round_to(expenses, 2),
            }
        })
        .collect();

    let profit_trend = match monthly_trends.as_slice() {
        [.., previous, last] => metrics::percent_change(last.profit, previous.profit),
        _ => 0.0,
    };

    FinancialReport {
        from: data.from,
        to: data.to,
        revenue: round_to(revenue, 2),
        profit: round_to(profit, 2),
        expenses: round_to(expenses, 2),
        profit_margin: metrics::profit_margin(profit, revenue),
        ebitda: round_to(profit + maintenance, 2),
        cash_flow,
        revenue_by_service: metrics::revenue_by_type(&data.appointments)
            .into_iter()
            .map(|(name, value)| NamedValue { name, value: round_to(value, 2) })
            .collect(),
        monthly_trends,
        profit_trend,
    }
}

// =====================================================================================
// ROOMS
// =====================================================================================

fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

pub fn room_report(data: &PeriodData, settings: &SchedulingSettings) -> RoomReport {
    let dates = data.dates();
    let total_hours = (settings.open_minutes_per_day() * dates.len() as i64) as f64 / 60.0;
    let available: Vec<_> = data.rooms.iter().filter(|room| room.is_available()).collect();

    let mut rooms: Vec<RoomUsage> = available
        .iter()
        .map(|room| {
            let in_room: Vec<&Appointment> = data
                .appointments
                .iter()
                .filter(|apt| apt.is_active() && apt.room_id == Some(room.id))
                .collect();
            let utilization = metrics::room_utilization(room.id, &data.appointments, &dates, settings);
            RoomUsage {
                id: room.id,
                name: room.room_name.clone(),
                utilization,
                hours_used: round_to(total_hours * utilization / 100.0, 1),
                total_hours,
                revenue: round_to(
                    in_room.iter().filter(|apt| apt.is_completed()).map(|apt| apt.final_price).sum(),
                    2,
                ),
                appointments_count: in_room.len(),
                level: metrics::utilization_level(utilization).to_string(),
            }
        })
        .collect();
    rooms.sort_by(|a, b| b.utilization.total_cmp(&a.utilization));

    let hourly_utilization: Vec<HourlyUtilization> = (settings.open_hour..settings.close_hour)
        .map(|hour| {
            let booked: i64 = dates
                .iter()
                .map(|date| {
                    let start = day_start(*date) + Duration::hours(hour as i64);
                    available
                        .iter()
                        .map(|room| metrics::booked_minutes(room.id, &data.appointments, start, start + Duration::hours(1)))
                        .sum::<i64>()
                })
                .sum();
            let capacity = 60 * dates.len() as i64 * available.len() as i64;
            HourlyUtilization {
                hour: format!("{:02}:00", hour),
                utilization: if capacity == 0 { 0.0 } else { round_to(booked as f64 / capacity as f64 * 100.0, 1) },
                appointments: data
                    .appointments
                    .iter()
                    .filter(|apt| apt.is_active() && apt.scheduled_start.hour() == hour)
                    .count(),
            }
        })
        .collect();

    let peak_hour = hourly_utilization
        .iter()
        .filter(|h| h.utilization > 0.0)
        .fold(None::<&HourlyUtilization>, |best, h| match best {
            Some(b) if b.utilization >= h.utilization => Some(b),
            _ => Some(h),
        })
        .map(|h| h.hour.clone());

    let mut by_weekday: BTreeMap<u32, Vec<NaiveDate>> = BTreeMap::new();
    for date in &dates {
        by_weekday.entry(date.weekday().num_days_from_monday()).or_default().push(*date);
    }
    let weekly_trends = by_weekday
        .values()
        .map(|days| {
            let on_days: Vec<Appointment> = data
                .appointments
                .iter()
                .filter(|apt| days.contains(&apt.scheduled_date()))
                .cloned()
                .collect();
            let active = on_days.iter().filter(|apt| apt.is_active()).count();
            let completed = on_days.iter().filter(|apt| apt.is_completed()).count();
            WeekdayTrend {
                day: weekday_label(days[0].weekday()).to_string(),
                utilization: metrics::overall_utilization(&data.rooms, &on_days, days, settings),
                efficiency: metrics::share_percent(completed as f64, active as f64),
            }
        })
        .collect();

    let recent: Vec<NaiveDate> = dates.iter().rev().take(7).copied().collect();
    let next_week_utilization = if recent.is_empty() {
        0.0
    } else {
        round_to(
            recent
                .iter()
                .map(|date| metrics::overall_utilization(&data.rooms, &data.appointments, &[*date], settings))
                .sum::<f64>()
                / recent.len() as f64,
            1,
        )
    };

    let optimization_suggestions = rooms
        .iter()
        .filter(|room| room.utilization < UNDERUSED_ROOM)
        .map(|room| RoomSuggestion {
            room: room.name.clone(),
            suggestion: format!("Move off-peak sessions into {} and promote its open slots", room.name),
            potential_increase: round_to(UNDERUSED_ROOM - room.utilization, 1),
        })
        .collect();

    RoomReport {
        from: data.from,
        to: data.to,
        overall_utilization: metrics::overall_utilization(&data.rooms, &data.appointments, &dates, settings),
        highly_utilized: rooms.iter().filter(|room| room.utilization > BUSY_ROOM).count(),
        peak_hour,
        rooms,
        hourly_utilization,
        weekly_trends,
        predictions: RoomPredictions {
            next_week_utilization,
            optimization_suggestions,
        },
    }
}

// =====================================================================================
// EMPLOYEES
// =====================================================================================

/// Share of an employee's clients seen more than once in the range.
fn repeat_client_rate(appointments: &[Appointment]) -> f64 {
    let mut visits: HashMap<Uuid, usize> = HashMap::new();
    for apt in appointments.iter().filter(|apt| apt.is_active()) {
        *visits.entry(apt.client_id).or_default() += 1;
    }
    if visits.is_empty() {
        return 0.0;
    }
    let repeat = visits.values().filter(|count| **count > 1).count();
    metrics::share_percent(repeat as f64, visits.len() as f64)
}

pub fn employee_insights(data: &PeriodData) -> Vec<EmployeeInsight> {
    let mut insights: Vec<EmployeeInsight> = data
        .employees
        .iter()
        .filter(|e| e.is_active())
        .map(|employee| {
            let appointments = data.appointments_for(employee.id);
            let performance = data.performance_for(employee.id);
            let revenue = metrics::revenue(&appointments);

            let logged_hours: f64 = performance.iter().filter_map(|row| row.hours_worked).sum();
            let hours_worked = if logged_hours > 0.0 {
                logged_hours
            } else {
                appointments
                    .iter()
                    .filter(|apt| apt.is_completed())
                    .map(|apt| apt.duration_minutes() as f64 / 60.0)
                    .sum()
            };

            let compensation: f64 = performance
                .iter()
                .map(|row| {
                    row.total_compensation.unwrap_or(
                        row.salary_component.unwrap_or(0.0) + row.commission_earned.unwrap_or(0.0),
                    )
                })
                .sum();

            let rating = metrics::satisfaction_percent(&data.feedback_for(employee.id))
                .map(|pct| round_to(pct / 20.0, 1))
                .unwrap_or(0.0);

            EmployeeInsight {
                id: employee.id,
                name: employee.full_name.clone(),
                role: employee.role.display_name().to_string(),
                hours_worked: round_to(hours_worked, 1),
                revenue: round_to(revenue, 2),
                appointments: appointments.iter().filter(|apt| apt.is_completed()).count(),
                rating,
                retention: repeat_client_rate(&appointments),
                compensation: round_to(compensation, 2),
                efficiency: if hours_worked > 0.0 { round_to(revenue / hours_worked, 2) } else { 0.0 },
            }
        })
        .collect();

    insights.sort_by(|a, b| b.revenue.total_cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));
    insights
}

pub fn employee_report(data: &PeriodData) -> EmployeeReport {
    let employees = employee_insights(data);

    let rated: Vec<f64> = employees.iter().map(|e| e.rating).filter(|r| *r > 0.0).collect();
    let average_rating = if rated.is_empty() {
        0.0
    } else {
        round_to(rated.iter().sum::<f64>() / rated.len() as f64, 1)
    };

    let mut by_role: BTreeMap<String, Vec<&EmployeeInsight>> = BTreeMap::new();
    for insight in &employees {
        by_role.entry(insight.role.clone()).or_default().push(insight);
    }
    let performance_by_role = by_role
        .iter()
        .map(|(role, members)| {
            let count = members.len();
            RolePerformance {
                role: role.clone(),
                avg_revenue: round_to(members.iter().map(|m| m.revenue).sum::<f64>() / count as f64, 2),
                avg_rating: round_to(members.iter().map(|m| m.rating).sum::<f64>() / count as f64, 1),
                count,
            }
        })
        .collect();
    let by_role_retention = by_role
        .iter()
        .map(|(role, members)| RoleRetention {
            role: role.clone(),
            retention: round_to(members.iter().map(|m| m.retention).sum::<f64>() / members.len() as f64, 1),
        })
        .collect();

    let mut per_month: BTreeMap<String, Vec<_>> = BTreeMap::new();
    for row in &data.performance {
        per_month.entry(month_key(row.performance_date)).or_default().push(row);
    }
    let monthly_performance = per_month
        .into_iter()
        .map(|(month, rows)| MonthlyPerformance {
            month,
            total_revenue: round_to(rows.iter().filter_map(|r| r.revenue_generated).sum(), 2),
            avg_satisfaction: metrics::performance_satisfaction(&rows).unwrap_or(0.0),
            hours_worked: round_to(rows.iter().filter_map(|r| r.hours_worked).sum(), 1),
        })
        .collect();

    EmployeeReport {
        from: data.from,
        to: data.to,
        total_employees: employees.len(),
        average_rating,
        total_compensation: round_to(employees.iter().map(|e| e.compensation).sum(), 2),
        top_performers: employees.iter().take(TOP_PERFORMERS).cloned().collect(),
        performance_by_role,
        monthly_performance,
        retention_metrics: RetentionMetrics {
            overall: metrics::retention(&data.appointments, &data.clients, data.from),
            by_role: by_role_retention,
        },
        employees,
    }
}

// =====================================================================================
// OPTIMIZATION
// =====================================================================================

pub fn optimization_report(
    current: &PeriodData,
    previous: &PeriodData,
    settings: &SchedulingSettings,
    targets: &TargetSettings,
) -> OptimizationReport {
    let dates = current.dates();
    let (revenue, _, profit) = profit_of(current);
    let previous_revenue = metrics::revenue(&previous.appointments);
    let seen = metrics::unique_clients(&current.appointments);
    let retention = metrics::retention(&current.appointments, &current.clients, current.from);
    let utilization = metrics::overall_utilization(&current.rooms, &current.appointments, &dates, settings);
    let hours: f64 = current.performance.iter().filter_map(|row| row.hours_worked).sum();
    let no_show_rate = metrics::no_show_rate(&current.appointments);

    let kpis = OptimizationKpis {
        client_retention: retention,
        appointment_utilization: utilization,
        revenue_per_client: if seen.is_empty() { 0.0 } else { round_to(revenue / seen.len() as f64, 2) },
        profit_margin: metrics::profit_margin(profit, revenue),
        employee_efficiency: if hours > 0.0 { round_to(revenue / hours, 2) } else { 0.0 },
        market_growth: metrics::percent_change(revenue, previous_revenue),
    };

    let completed = current.appointments.iter().filter(|apt| apt.is_completed()).count();
    let revenue_per_booked_hour = {
        let booked_hours: f64 = current
            .appointments
            .iter()
            .filter(|apt| apt.is_completed())
            .map(|apt| apt.duration_minutes() as f64 / 60.0)
            .sum();
        if booked_hours > 0.0 { revenue / booked_hours } else { 0.0 }
    };

    let mut opportunities = Vec::new();
    for room in current.rooms.iter().filter(|room| room.is_available()) {
        let rate = metrics::room_utilization(room.id, &current.appointments, &dates, settings);
        if rate < UNDERUSED_ROOM {
            let open_hours = (settings.open_minutes_per_day() * dates.len() as i64) as f64 / 60.0;
            let gap_hours = open_hours * (UNDERUSED_ROOM - rate) / 100.0;
            opportunities.push(Opportunity {
                category: "Room Utilization".to_string(),
                description: format!("{} is booked {}% of clinic hours; fill it to {}%", room.room_name, rate, UNDERUSED_ROOM),
                impact: if rate < 30.0 { Level::High } else { Level::Medium },
                effort: Level::Low,
                potential_revenue: round_to(gap_hours * revenue_per_booked_hour, 2),
                priority: if rate < 30.0 { 8 } else { 6 },
            });
        }
    }

    let outstanding = metrics::outstanding_amount(&current.appointments);
    if outstanding > 0.0 {
        opportunities.push(Opportunity {
            category: "Collections".to_string(),
            description: format!("${:.2} is pending or overdue; chase unpaid sessions", outstanding),
            impact: Level::High,
            effort: Level::Low,
            potential_revenue: round_to(outstanding, 2),
            priority: 9,
        });
    }

    if retention < RETENTION_FLOOR && !seen.is_empty() {
        let lost_clients = seen.len() as f64 * (RETENTION_FLOOR - retention) / 100.0;
        opportunities.push(Opportunity {
            category: "Client Retention".to_string(),
            description: "Book follow-ups before clients leave and run a recall campaign".to_string(),
            impact: Level::Medium,
            effort: Level::Medium,
            potential_revenue: round_to(lost_clients * metrics::average_session_value(&current.appointments), 2),
            priority: 7,
        });
    }
    opportunities.sort_by(|a, b| b.priority.cmp(&a.priority));

    let mut risk_factors = Vec::new();
    let mut action_items = Vec::new();

    if no_show_rate > targets.no_show_rate {
        let no_shows: f64 = current
            .appointments
            .iter()
            .filter(|apt| apt.status() == AppointmentStatus::NoShow)
            .map(|apt| apt.final_price)
            .sum();
        risk_factors.push(RiskFactor {
            factor: "High no-show rate".to_string(),
            severity: if no_show_rate > targets.no_show_rate * 2.0 { Level::High } else { Level::Medium },
            probability: Level::High,
            impact: format!("${:.2} of booked sessions lost", no_shows),
            mitigation: "Send SMS reminders 24h ahead and take deposits for repeat no-shows".to_string(),
        });
        action_items.push(ActionItem {
            title: format!("Cut no-shows from {}% to {}%", no_show_rate, targets.no_show_rate),
            deadline: current.to + Duration::days(7),
            priority: Level::High,
            owner: "Front Desk".to_string(),
            estimated_impact: format!("${:.2}", no_shows),
        });
    }

    if retention < RETENTION_FLOOR && !seen.is_empty() {
        risk_factors.push(RiskFactor {
            factor: "Low client retention".to_string(),
            severity: Level::Medium,
            probability: Level::Medium,
            impact: format!("Only {}% of clients are returning", retention),
            mitigation: "Schedule the next session at checkout".to_string(),
        });
    }

    let period_target = targets.employee_revenue * dates.len() as f64 / 7.0;
    for insight in employee_insights(current).iter().filter(|e| e.revenue < period_target) {
        action_items.push(ActionItem {
            title: format!("Revenue coaching for {}", insight.name),
            deadline: current.to + Duration::days(14),
            priority: if insight.revenue < period_target / 2.0 { Level::Medium } else { Level::Low },
            owner: insight.name.clone(),
            estimated_impact: format!("${:.2}", period_target - insight.revenue),
        });
    }
    action_items.sort_by(|a, b| a.priority.cmp(&b.priority));

    let paid = current
        .appointments
        .iter()
        .filter(|apt| apt.is_completed() && apt.payment_status == Some(PaymentStatus::Paid))
        .count();
    let returning = metrics::returning_clients(&seen, &current.clients, current.from);
    let conversion_funnel = vec![
        NamedValue { name: "Booked".to_string(), value: current.appointments.len() as f64 },
        NamedValue { name: "Attended".to_string(), value: completed as f64 },
        NamedValue { name: "Paid".to_string(), value: paid as f64 },
        NamedValue { name: "Returning".to_string(), value: returning as f64 },
    ];

    OptimizationReport {
        from: current.from,
        to: current.to,
        kpis,
        opportunities,
        risk_factors,
        conversion_funnel,
        action_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_utils::test_utils::MockClinicRows;

    struct Ids {
        sarah: Uuid,
        kayden: Uuid,
        gym: Uuid,
    }

    fn data(from: &str, to: &str) -> (PeriodData, Ids) {
        let ids = Ids {
            sarah: Uuid::new_v4(),
            kayden: Uuid::new_v4(),
            gym: Uuid::new_v4(),
        };
        let (c1, c2) = (Uuid::new_v4(), Uuid::new_v4());
        let data = PeriodData {
            from: NaiveDate::parse_from_str(from, "%Y-%m-%d").unwrap(),
            to: NaiveDate::parse_from_str(to, "%Y-%m-%d").unwrap(),
            appointments: serde_json::from_value(json!([
                MockClinicRows::appointment(ids.sarah, c1, ids.gym, "2025-02-27T09:00:00Z", "2025-02-27T10:00:00Z", "completed", 200.0),
                MockClinicRows::appointment(ids.sarah, c1, ids.gym, "2025-03-03T09:00:00Z", "2025-03-03T11:00:00Z", "completed", 400.0),
                MockClinicRows::appointment(ids.kayden, c2, ids.gym, "2025-03-03T13:00:00Z", "2025-03-03T14:00:00Z", "no_show", 100.0),
            ]))
            .unwrap(),
            transactions: serde_json::from_value(json!([
                MockClinicRows::transaction(150.0, "payment", "2025-02-27T10:00:00Z"),
                MockClinicRows::transaction(100.0, "rent", "2025-03-01T10:00:00Z"),
            ]))
            .unwrap(),
            equipment: serde_json::from_value(json!([
                MockClinicRows::equipment_usage(ids.gym, "Treadmill", "2025-03-03T09:00:00Z", 25.0),
            ]))
            .unwrap(),
            rooms: serde_json::from_value(json!([MockClinicRows::room(ids.gym, "Gym Area")])).unwrap(),
            employees: serde_json::from_value(json!([
                MockClinicRows::employee(ids.sarah, "Sarah Chen", "partner", &[]),
                MockClinicRows::employee(ids.kayden, "Kayden", "junior", &[]),
            ]))
            .unwrap(),
            clients: serde_json::from_value(json!([
                MockClinicRows::client(c1, "Lena Park", "2024-01-01"),
                MockClinicRows::client(c2, "Tom Ng", "2025-03-03"),
            ]))
            .unwrap(),
            ..PeriodData::default()
        };
        (data, ids)
    }

    #[test]
    fn financial_report_splits_months() {
        let (data, _) = data("2025-02-27", "2025-03-03");
        let report = financial_report(&data);

        assert_eq!(report.revenue, 600.0);
        assert_eq!(report.expenses, 100.0);
        assert_eq!(report.profit, 500.0);
        assert_eq!(report.ebitda, 525.0);
        assert_eq!(report.monthly_trends.len(), 2);
        assert_eq!(report.monthly_trends[0].month, "2025-02");
        assert_eq!(report.monthly_trends[0].profit, 200.0);
        assert_eq!(report.monthly_trends[1].profit, 300.0);
        assert_eq!(report.profit_trend, 50.0);
        assert_eq!(report.cash_flow[0].inflow, 150.0);
        assert_eq!(report.revenue_by_service[0].name, "Physio");
    }

    #[test]
    fn room_report_levels_and_predictions() {
        let (data, ids) = data("2025-03-03", "2025-03-03");
        let report = room_report(&data, &SchedulingSettings::default());

        let gym = &report.rooms[0];
        assert_eq!(gym.id, ids.gym);
        assert_eq!(gym.utilization, 20.0);
        assert_eq!(gym.hours_used, 2.0);
        assert_eq!(gym.total_hours, 10.0);
        assert_eq!(gym.level, "low");
        assert_eq!(report.hourly_utilization.len(), 10);
        assert_eq!(report.peak_hour.as_deref(), Some("09:00"));
        assert_eq!(report.predictions.optimization_suggestions[0].potential_increase, 40.0);
        assert_eq!(report.weekly_trends[0].day, "Mon");
    }

    #[test]
    fn employees_sorted_by_revenue() {
        let (data, ids) = data("2025-02-27", "2025-03-03");
        let report = employee_report(&data);

        assert_eq!(report.total_employees, 2);
        assert_eq!(report.employees[0].id, ids.sarah);
        assert_eq!(report.employees[0].appointments, 2);
        assert_eq!(report.employees[0].hours_worked, 3.0);
        assert_eq!(report.employees[0].efficiency, 200.0);
        assert_eq!(report.employees[0].retention, 100.0);
        assert_eq!(report.employees[1].revenue, 0.0);
        assert_eq!(report.performance_by_role.len(), 2);
    }

    #[test]
    fn optimization_flags_no_shows_and_underperformers() {
        let (data, _) = data("2025-03-03", "2025-03-03");
        let previous = PeriodData::default();
        let report = optimization_report(&data, &previous, &SchedulingSettings::default(), &TargetSettings::default());

        assert!(report.risk_factors.iter().any(|r| r.factor == "High no-show rate"));
        assert_eq!(report.action_items[0].priority, Level::High);
        assert!(report.action_items.iter().any(|a| a.owner == "Kayden"));
        assert!(report.opportunities.iter().any(|o| o.category == "Room Utilization"));
        assert!(report.opportunities.windows(2).all(|w| w[0].priority >= w[1].priority));
        assert_eq!(report.conversion_funnel[0].value, 3.0);
        assert_eq!(report.conversion_funnel[1].value, 2.0);
        assert_eq!(report.kpis.market_growth, 0.0);
    }
}
