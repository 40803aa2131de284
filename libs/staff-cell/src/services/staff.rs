// =====================================================================================
// STAFF SERVICE
// =====================================================================================

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use analytics_cell::PeriodData;
use shared_config::AppConfig;
use shared_database::ClinicRepository;

use crate::models::{
    format_amount, CompensationReport, EmployeeAdvice, EmployeeListing, StaffError, TargetResponse,
};
use crate::services::advice::employee_advice;
use crate::services::compensation::compensation_report;
use crate::services::targets::TargetStore;

pub struct StaffService {
    repo: ClinicRepository,
    targets: Arc<TargetStore>,
}

impl StaffService {
    pub fn new(config: &AppConfig, targets: Arc<TargetStore>) -> Self {
        Self {
            repo: ClinicRepository::new(config),
            targets,
        }
    }

    #[instrument(skip(self))]
    pub async fn employees(&self) -> Result<Vec<EmployeeListing>, StaffError> {
        let employees = self.repo.employees().await?;
        let targets = self.targets.snapshot().await;

        Ok(employees
            .into_iter()
            .map(|employee| EmployeeListing {
                id: employee.id,
                role: employee.role.display_name().to_string(),
                is_active: employee.is_active(),
                target: targets
                    .get(&employee.id)
                    .copied()
                    .unwrap_or(self.targets.default_target()),
                name: employee.full_name,
                email: employee.email,
                specializations: employee.specializations.unwrap_or_default(),
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn advice(&self, employee_id: Uuid, from: NaiveDate, to: NaiveDate) -> Result<EmployeeAdvice, StaffError> {
        let (employee, data) = futures::try_join!(
            self.repo.employee(employee_id),
            PeriodData::load(&self.repo, from, to),
        )?;
        let target = self.targets.get(employee_id).await;

        let advice = employee_advice(&employee, &data, target);
        info!("Advice for {}: {} line(s)", advice.name, advice.advice.len());
        Ok(advice)
    }

    #[instrument(skip(self))]
    pub async fn set_target(&self, employee_id: Uuid, target: f64) -> Result<TargetResponse, StaffError> {
        if !target.is_finite() || target <= 0.0 {
            warn!("Rejected target {} for {}", target, employee_id);
            return Err(StaffError::InvalidTarget);
        }

        let employee = self.repo.employee(employee_id).await?;
        self.targets.set(employee_id, target).await;

        Ok(TargetResponse {
            employee_id,
            target,
            message: format!("Target for {} set to ${}", employee.full_name, format_amount(target)),
        })
    }

    #[instrument(skip(self))]
    pub async fn compensation(&self, from: NaiveDate, to: NaiveDate) -> Result<CompensationReport, StaffError> {
        let data = PeriodData::load(&self.repo, from, to).await?;
        Ok(compensation_report(&data))
    }
}
