// =====================================================================================
// REPORT CARD SERVICE
// =====================================================================================

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{info, instrument};

use analytics_cell::services::metrics::day_start;
use analytics_cell::PeriodData;
use shared_config::{AppConfig, SchedulingSettings, TargetSettings};
use shared_database::ClinicRepository;
use staff_cell::TargetStore;

use crate::models::{DailyReport, Report, ReportError, ReportKind, WeeklyReport};
use crate::services::daily::build_daily_report;
use crate::services::weekly::{build_weekly_report, week_start, WeekContext};

/// How far back unpaid appointments are looked for.
const RECEIVABLES_DAYS: i64 = 90;

pub struct ReportService {
    repo: ClinicRepository,
    scheduling: SchedulingSettings,
    targets: TargetSettings,
    employee_targets: Arc<TargetStore>,
}

impl ReportService {
    pub fn new(config: &AppConfig, employee_targets: Arc<TargetStore>) -> Self {
        Self {
            repo: ClinicRepository::new(config),
            scheduling: config.scheduling.clone(),
            targets: config.targets.clone(),
            employee_targets,
        }
    }

    pub async fn report(&self, kind: ReportKind, date: NaiveDate) -> Result<Report, ReportError> {
        Ok(match kind {
            ReportKind::Daily => Report::Daily(self.daily(date).await?),
            ReportKind::Weekly => Report::Weekly(self.weekly(date).await?),
        })
    }

    #[instrument(skip(self))]
    pub async fn daily(&self, date: NaiveDate) -> Result<DailyReport, ReportError> {
        let yesterday = date - Duration::days(1);
        let tomorrow = day_start(date + Duration::days(1));
        let (two_days, next_day) = futures::try_join!(
            PeriodData::load(&self.repo, yesterday, date),
            self.repo.appointments_between(tomorrow, tomorrow + Duration::days(1)),
        )?;

        let report = build_daily_report(
            date,
            &two_days.slice(date, date),
            &two_days.slice(yesterday, yesterday),
            &next_day,
            &self.scheduling,
            &self.targets,
        );
        info!("Daily report for {}: {} staff lines", date, report.employees.len());
        Ok(report)
    }

    #[instrument(skip(self))]
    pub async fn weekly(&self, date: NaiveDate) -> Result<WeeklyReport, ReportError> {
        let monday = week_start(date);
        let sunday = monday + Duration::days(6);
        let previous_monday = monday - Duration::days(7);
        let week_close = day_start(sunday) + Duration::days(1);

        let (fortnight, next_week, receivables) = futures::try_join!(
            PeriodData::load(&self.repo, previous_monday, sunday),
            self.repo.appointments_between(week_close, week_close + Duration::days(7)),
            self.repo.appointments_between(week_close - Duration::days(RECEIVABLES_DAYS), week_close),
        )?;

        let week = fortnight.slice(monday, sunday);
        let previous = fortnight.slice(previous_monday, monday - Duration::days(1));
        let targets = self.employee_targets.snapshot().await;
        let default_target = self.employee_targets.default_target();

        let ctx = WeekContext {
            previous: &previous,
            next_week: &next_week,
            receivables: &receivables,
            settings: &self.scheduling,
        };
        let report = build_weekly_report(date, &week, &ctx, |id| {
            targets.get(&id).copied().unwrap_or(default_target)
        });
        info!("Weekly report for {}..={}", monday, sunday);
        Ok(report)
    }
}
