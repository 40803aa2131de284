use chrono::{Duration, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use shared_database::ClinicRepository;
use shared_models::clinic::{
    Appointment, Client, ClientFeedback, Employee, EmployeePerformance, EquipmentUsage,
    FinancialTransaction, Room,
};
use shared_models::error::AppError;

use crate::services::metrics::{day_start, days_in};

/// All rows touching an inclusive date range.
#[derive(Debug, Clone, Default)]
pub struct PeriodData {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub appointments: Vec<Appointment>,
    pub transactions: Vec<FinancialTransaction>,
    pub performance: Vec<EmployeePerformance>,
    pub feedback: Vec<ClientFeedback>,
    pub equipment: Vec<EquipmentUsage>,
    pub rooms: Vec<Room>,
    pub employees: Vec<Employee>,
    pub clients: Vec<Client>,
}

impl PeriodData {
    pub async fn load(repo: &ClinicRepository, from: NaiveDate, to: NaiveDate) -> Result<Self, AppError> {
        let (start, end) = (day_start(from), day_start(to) + Duration::days(1));
        debug!("Loading analytics rows for {}..={}", from, to);

        let (appointments, transactions, performance, feedback, equipment, rooms, employees) = futures::try_join!(
            repo.appointments_between(start, end),
            repo.transactions_between(start, end),
            repo.employee_performance_between(from, to),
            repo.feedback_between(start, end),
            repo.equipment_usage_between(start, end),
            repo.rooms(),
            repo.employees(),
        )?;

        let mut client_ids: Vec<Uuid> = appointments.iter().map(|apt| apt.client_id).collect();
        client_ids.sort();
        client_ids.dedup();
        let clients = repo.clients_by_ids(&client_ids).await?;

        Ok(Self {
            from,
            to,
            appointments,
            transactions,
            performance,
            feedback,
            equipment,
            rooms,
            employees,
            clients,
        })
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        days_in(self.from, self.to)
    }

    /// The rows that fall on `from..=to`; reference tables are kept whole.
    pub fn slice(&self, from: NaiveDate, to: NaiveDate) -> PeriodData {
        let within = |date: NaiveDate| date >= from && date <= to;
        PeriodData {
            from,
            to,
            appointments: self
                .appointments
                .iter()
                .filter(|apt| within(apt.scheduled_date()))
                .cloned()
                .collect(),
            transactions: self
                .transactions
                .iter()
                .filter(|tx| tx.booked_at().map_or(false, |at| within(at.date_naive())))
                .cloned()
                .collect(),
            performance: self
                .performance
                .iter()
                .filter(|row| within(row.performance_date))
                .cloned()
                .collect(),
            feedback: self
                .feedback
                .iter()
                .filter(|f| f.created_at.map_or(false, |at| within(at.date_naive())))
                .cloned()
                .collect(),
            equipment: self
                .equipment
                .iter()
                .filter(|usage| within(usage.usage_start.date_naive()))
                .cloned()
                .collect(),
            rooms: self.rooms.clone(),
            employees: self.employees.clone(),
            clients: self.clients.clone(),
        }
    }

    pub fn employee_name(&self, id: Uuid) -> Option<&str> {
        self.employees.iter().find(|e| e.id == id).map(|e| e.full_name.as_str())
    }

    pub fn feedback_for(&self, employee_id: Uuid) -> Vec<&ClientFeedback> {
        self.feedback.iter().filter(|f| f.employee_id == employee_id).collect()
    }

    pub fn performance_for(&self, employee_id: Uuid) -> Vec<&EmployeePerformance> {
        self.performance.iter().filter(|row| row.employee_id == employee_id).collect()
    }

    pub fn appointments_for(&self, employee_id: Uuid) -> Vec<Appointment> {
        self.appointments
            .iter()
            .filter(|apt| apt.employee_id == employee_id)
            .cloned()
            .collect()
    }
}
