use chrono::{Duration, NaiveDate};
use tracing::debug;

use shared_config::SchedulingSettings;
use shared_database::ClinicRepository;
use shared_models::clinic::{
    Appointment, AppointmentType, Employee, EmployeeWorkSchedule, Room, ScheduleException,
    ServiceCatalogItem,
};
use shared_models::error::AppError;

use crate::services::slots::{midnight, SchedulingContext};

/// Every row the slot engine looks at for one calendar day.
#[derive(Debug, Clone, Default)]
pub struct DaySnapshot {
    pub appointments: Vec<Appointment>,
    pub employees: Vec<Employee>,
    pub rooms: Vec<Room>,
    pub schedules: Vec<EmployeeWorkSchedule>,
    pub exceptions: Vec<ScheduleException>,
    pub catalog: Vec<ServiceCatalogItem>,
}

impl DaySnapshot {
    pub async fn load(repo: &ClinicRepository, date: NaiveDate) -> Result<Self, AppError> {
        let day = midnight(date);
        debug!("Loading scheduling snapshot for {}", date);

        let (appointments, employees, rooms, schedules, exceptions, catalog) = futures::try_join!(
            repo.appointments_between(day, day + Duration::days(1)),
            repo.employees(),
            repo.rooms(),
            repo.work_schedules(),
            repo.schedule_exceptions_on(date),
            repo.service_catalog(),
        )?;

        Ok(Self {
            appointments,
            employees,
            rooms,
            schedules,
            exceptions,
            catalog,
        })
    }

    pub fn context<'a>(&'a self, settings: &'a SchedulingSettings) -> SchedulingContext<'a> {
        SchedulingContext {
            settings,
            employees: &self.employees,
            rooms: &self.rooms,
            booked: &self.appointments,
            schedules: &self.schedules,
            exceptions: &self.exceptions,
        }
    }

    /// Catalog entry whose name reads as the appointment type.
    pub fn catalog_entry(&self, appointment_type: AppointmentType) -> Option<&ServiceCatalogItem> {
        let label = appointment_type.label().to_lowercase();
        self.catalog.iter().find(|item| {
            AppointmentType::parse_loose(&item.name) == Some(appointment_type)
                || item.name.to_lowercase().contains(&label)
        })
    }
}
