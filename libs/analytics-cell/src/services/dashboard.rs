// =====================================================================================
// DASHBOARD & RANGE ANALYTICS SERVICE
// =====================================================================================

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use shared_config::{AppConfig, SchedulingSettings, TargetSettings};
use shared_database::ClinicRepository;
use shared_models::clinic::Appointment;
use shared_models::error::AppError;

use crate::models::{
    AlertKind, AnalyticsSummary, CashCollected, Dashboard, DashboardAlert, EmployeeReport,
    FinancialReport, OptimizationReport, PatientsSeen, RoomRate, RoomReport,
    RoomUtilizationSummary, TargetedValue, TopPerformer, TrendPoint, ValueChange,
};
use crate::services::dataset::PeriodData;
use crate::services::insights;
use crate::services::metrics::{self, clinic_window, day_start, round_to};

const IDLE_GAP_HOURS: i64 = 2;
const BAND_HOURS: u32 = 2;
const UNDERBOOKED_THRESHOLD: f64 = 50.0;
const TREND_DAYS: i64 = 7;

pub struct AnalyticsService {
    repo: ClinicRepository,
    scheduling: SchedulingSettings,
    targets: TargetSettings,
}

impl AnalyticsService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            repo: ClinicRepository::new(config),
            scheduling: config.scheduling.clone(),
            targets: config.targets.clone(),
        }
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self, date: NaiveDate) -> Result<Dashboard, AppError> {
        let tomorrow = day_start(date + Duration::days(1));
        let (two_days, next_day) = futures::try_join!(
            PeriodData::load(&self.repo, date - Duration::days(1), date),
            self.repo.appointments_between(tomorrow, tomorrow + Duration::days(1)),
        )?;

        let today = two_days.slice(date, date);
        let yesterday = two_days.slice(date - Duration::days(1), date - Duration::days(1));
        info!("Dashboard for {}: {} appointments", date, today.appointments.len());

        Ok(build_dashboard(date, &today, &yesterday, &next_day, &self.scheduling, &self.targets))
    }

    #[instrument(skip(self))]
    pub async fn summary(&self, date: NaiveDate) -> Result<AnalyticsSummary, AppError> {
        let week = PeriodData::load(&self.repo, date - Duration::days(TREND_DAYS - 1), date).await?;
        Ok(build_summary(date, &week, &self.scheduling))
    }

    pub async fn financial(&self, from: NaiveDate, to: NaiveDate) -> Result<FinancialReport, AppError> {
        let data = PeriodData::load(&self.repo, from, to).await?;
        Ok(insights::financial_report(&data))
    }

    pub async fn rooms(&self, from: NaiveDate, to: NaiveDate) -> Result<RoomReport, AppError> {
        let data = PeriodData::load(&self.repo, from, to).await?;
        Ok(insights::room_report(&data, &self.scheduling))
    }

    pub async fn employees(&self, from: NaiveDate, to: NaiveDate) -> Result<EmployeeReport, AppError> {
        let data = PeriodData::load(&self.repo, from, to).await?;
        Ok(insights::employee_report(&data))
    }

    /// Compares the range with the preceding range of the same length.
    pub async fn optimization(&self, from: NaiveDate, to: NaiveDate) -> Result<OptimizationReport, AppError> {
        let length = (to - from).num_days() + 1;
        let previous_from = from - Duration::days(length);
        let data = PeriodData::load(&self.repo, previous_from, to).await?;

        let current = data.slice(from, to);
        let previous = data.slice(previous_from, from - Duration::days(1));
        debug!("Optimisation over {} days against {}..{}", length, previous_from, from);

        Ok(insights::optimization_report(&current, &previous, &self.scheduling, &self.targets))
    }
}

// =====================================================================================
// BUILDERS
// =====================================================================================

pub fn build_dashboard(
    date: NaiveDate,
    today: &PeriodData,
    yesterday: &PeriodData,
    tomorrow: &[Appointment],
    settings: &SchedulingSettings,
    targets: &TargetSettings,
) -> Dashboard {
    let revenue = metrics::revenue(&today.appointments);
    let previous_revenue = metrics::revenue(&yesterday.appointments);
    let ebita = metrics::ebita(revenue, metrics::expenses(&today.transactions, &today.performance));
    let previous_ebita = metrics::ebita(
        previous_revenue,
        metrics::expenses(&yesterday.transactions, &yesterday.performance),
    );
    let cash = metrics::cash_collected(&today.transactions);

    let dates = [date];
    let rooms = today
        .rooms
        .iter()
        .filter(|room| room.is_available())
        .map(|room| RoomRate {
            id: room.id,
            name: room.room_name.clone(),
            rate: metrics::room_utilization(room.id, &today.appointments, &dates, settings),
        })
        .collect();

    let (walk_ins, pre_booked) = metrics::walk_in_split(&today.appointments);
    let session_value = metrics::average_session_value(&today.appointments);

    Dashboard {
        date,
        daily_revenue: TargetedValue {
            value: round_to(revenue, 2),
            change: metrics::percent_change(revenue, previous_revenue),
            target: targets.daily_revenue,
        },
        ebita: TargetedValue {
            value: round_to(ebita, 2),
            change: metrics::percent_change(ebita, previous_ebita),
            target: targets.daily_ebita,
        },
        profit_margin: metrics::profit_margin(ebita, revenue),
        cash_collected: CashCollected {
            value: round_to(cash, 2),
            rate: metrics::share_percent(cash, revenue),
        },
        room_utilization: RoomUtilizationSummary {
            overall: metrics::overall_utilization(&today.rooms, &today.appointments, &dates, settings),
            rooms,
        },
        patients_seen: PatientsSeen {
            total: walk_ins + pre_booked,
            walk_ins,
            pre_booked,
        },
        avg_session_value: ValueChange {
            value: session_value,
            change: metrics::percent_change(session_value, metrics::average_session_value(&yesterday.appointments)),
        },
        no_show_rate: metrics::no_show_rate(&today.appointments),
        top_performer: top_performer(today),
        alerts: dashboard_alerts(date, today, tomorrow, settings, targets),
    }
}

/// Highest completed revenue of the period.
pub fn top_performer(data: &PeriodData) -> Option<TopPerformer> {
    let mut revenue_by_employee: HashMap<Uuid, f64> = HashMap::new();
    for apt in data.appointments.iter().filter(|apt| apt.is_completed()) {
        *revenue_by_employee.entry(apt.employee_id).or_default() += apt.final_price;
    }

    let (id, revenue) = revenue_by_employee
        .into_iter()
        .filter(|(_, revenue)| *revenue > 0.0)
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))?;

    let satisfaction = metrics::satisfaction_percent(&data.feedback_for(id))
        .or_else(|| metrics::performance_satisfaction(&data.performance_for(id)))
        .unwrap_or(0.0);

    Some(TopPerformer {
        id,
        name: data.employee_name(id).unwrap_or("Unknown").to_string(),
        satisfaction,
        revenue: round_to(revenue, 2),
    })
}

fn format_hours(minutes: i64) -> String {
    format!("{}", round_to(minutes as f64 / 60.0, 1))
}

pub fn dashboard_alerts(
    date: NaiveDate,
    today: &PeriodData,
    tomorrow: &[Appointment],
    settings: &SchedulingSettings,
    targets: &TargetSettings,
) -> Vec<DashboardAlert> {
    let mut alerts = Vec::new();
    let (open, close) = clinic_window(date, settings);

    for room in today.rooms.iter().filter(|room| room.is_available()) {
        for (start, end) in metrics::idle_gaps(room.id, &today.appointments, open, close, Duration::hours(IDLE_GAP_HOURS)) {
            alerts.push(DashboardAlert {
                kind: AlertKind::Warning,
                message: format!(
                    "{} idle {} hrs ({}-{}) - scheduling gap",
                    room.room_name,
                    format_hours((end - start).num_minutes()),
                    start.format("%H:%M"),
                    end.format("%H:%M")
                ),
            });
        }
    }

    let no_show_rate = metrics::no_show_rate(&today.appointments);
    if no_show_rate > targets.no_show_rate {
        alerts.push(DashboardAlert {
            kind: AlertKind::Warning,
            message: format!(
                "No-show rate {}% is above the {}% target - confirm tomorrow's bookings",
                no_show_rate, targets.no_show_rate
            ),
        });
    }

    let (next_open, next_close) = clinic_window(date + Duration::days(1), settings);
    let mut quietest: Option<(DateTime<Utc>, DateTime<Utc>, f64)> = None;
    let mut band_start = next_open;
    while band_start < next_close {
        let band_end = (band_start + Duration::hours(BAND_HOURS as i64)).min(next_close);
        let rate = metrics::window_utilization(&today.rooms, tomorrow, band_start, band_end);
        if quietest.map_or(true, |(_, _, lowest)| rate < lowest) {
            quietest = Some((band_start, band_end, rate));
        }
        band_start = band_end;
    }
    if let Some((start, end, rate)) = quietest {
        if rate < UNDERBOOKED_THRESHOLD {
            alerts.push(DashboardAlert {
                kind: AlertKind::Suggestion,
                message: format!(
                    "Tomorrow {}-{} is only {}% booked - offer those slots to the waitlist",
                    start.format("%H:%M"),
                    end.format("%H:%M"),
                    rate
                ),
            });
        }
    }

    alerts
}

pub fn build_summary(date: NaiveDate, week: &PeriodData, settings: &SchedulingSettings) -> AnalyticsSummary {
    let day = week.slice(date, date);
    let revenue = metrics::revenue(&day.appointments);

    let trend = week
        .dates()
        .into_iter()
        .map(|d| {
            let slice = week.slice(d, d);
            let revenue = metrics::revenue(&slice.appointments);
            TrendPoint {
                date: d,
                revenue: round_to(revenue, 2),
                profit: round_to(metrics::ebita(revenue, metrics::expenses(&slice.transactions, &slice.performance)), 2),
            }
        })
        .collect();

    AnalyticsSummary {
        date,
        revenue: round_to(revenue, 2),
        profit: round_to(metrics::ebita(revenue, metrics::expenses(&day.transactions, &day.performance)), 2),
        retention: metrics::retention(&day.appointments, &day.clients, date),
        unique_clients: metrics::unique_clients(&day.appointments).len(),
        utilization: metrics::overall_utilization(&day.rooms, &day.appointments, &[date], settings),
        trend,
    }
}
