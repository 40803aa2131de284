use std::sync::Arc;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use reqwest::{header::{HeaderMap, HeaderValue}, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::clinic::{
    Appointment, Client, ClientFeedback, Employee, EmployeePerformance,
    EmployeeWorkSchedule, EquipmentUsage, FinancialTransaction, NewAppointment, Room,
    ScheduleException, ServiceCatalogItem,
};
use shared_models::error::AppError;

use crate::supabase::{SupabaseClient, SupabaseError};

/// Typed PostgREST queries over the clinic schema.
#[derive(Clone)]
pub struct ClinicRepository {
    supabase: Arc<SupabaseClient>,
    auth_token: Option<String>,
}

fn ts(value: DateTime<Utc>) -> String {
    urlencoding::encode(&value.to_rfc3339_opts(SecondsFormat::Secs, true)).into_owned()
}

fn map_db_error(err: anyhow::Error) -> AppError {
    match err.downcast_ref::<SupabaseError>() {
        Some(SupabaseError::Conflict(msg)) => AppError::Conflict(msg.clone()),
        Some(SupabaseError::NotFound(msg)) => AppError::NotFound(msg.clone()),
        Some(SupabaseError::Auth(msg)) => AppError::Auth(msg.clone()),
        Some(SupabaseError::Api { status, message }) if *status >= 500 => {
            AppError::ExternalService(format!("database unavailable ({}): {}", status, message))
        }
        _ => AppError::Database(err.to_string()),
    }
}

impl ClinicRepository {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            auth_token: None,
        }
    }

    pub fn from_client(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase, auth_token: None }
    }

    /// Same connection, acting as the caller instead of the anon role.
    pub fn for_token(&self, token: &str) -> Self {
        Self {
            supabase: Arc::clone(&self.supabase),
            auth_token: Some(token.to_string()),
        }
    }

    async fn select<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, AppError> {
        debug!("Querying {}", path);
        self.supabase
            .request::<Vec<T>>(Method::GET, path, self.auth_token.as_deref(), None)
            .await
            .map_err(map_db_error)
    }

    async fn insert<T: DeserializeOwned>(&self, table: &str, body: Value) -> Result<T, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let path = format!("/rest/v1/{}", table);
        let mut rows: Vec<T> = self.supabase
            .request_with_headers(Method::POST, &path, self.auth_token.as_deref(), Some(body), Some(headers))
            .await
            .map_err(map_db_error)?;

        if rows.is_empty() {
            return Err(AppError::Database(format!("Insert into {} returned no rows", table)));
        }
        Ok(rows.swap_remove(0))
    }

    // ---------------------------------------------------------------------
    // appointments
    // ---------------------------------------------------------------------

    pub async fn appointments_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppError> {
        let path = format!(
            "/rest/v1/appointments?select=*&scheduled_start=gte.{}&scheduled_start=lt.{}&order=scheduled_start.asc",
            ts(from),
            ts(to)
        );
        self.select(&path).await
    }

    pub async fn appointments_for_room_overlapping(
        &self,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppError> {
        let path = format!(
            "/rest/v1/appointments?select=*&room_id=eq.{}&scheduled_start=lt.{}&scheduled_end=gt.{}",
            room_id,
            ts(end),
            ts(start)
        );
        self.select(&path).await
    }

    pub async fn appointments_for_employee_overlapping(
        &self,
        employee_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, AppError> {
        let path = format!(
            "/rest/v1/appointments?select=*&employee_id=eq.{}&scheduled_start=lt.{}&scheduled_end=gt.{}",
            employee_id,
            ts(end),
            ts(start)
        );
        self.select(&path).await
    }

    pub async fn insert_appointment(&self, new: &NewAppointment) -> Result<Appointment, AppError> {
        let body = serde_json::to_value(new)
            .map_err(|e| AppError::Internal(format!("Failed to encode appointment: {}", e)))?;
        self.insert("appointments", body).await
    }

    // ---------------------------------------------------------------------
    // people and places
    // ---------------------------------------------------------------------

    pub async fn rooms(&self) -> Result<Vec<Room>, AppError> {
        self.select("/rest/v1/rooms?select=*&order=room_number.asc").await
    }

    pub async fn employees(&self) -> Result<Vec<Employee>, AppError> {
        self.select("/rest/v1/employees?select=*&order=full_name.asc").await
    }

    pub async fn employee(&self, id: Uuid) -> Result<Employee, AppError> {
        let path = format!("/rest/v1/employees?select=*&id=eq.{}", id);
        self.select::<Employee>(&path)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", id)))
    }

    pub async fn clients_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Client>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let list = ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(",");
        let path = format!("/rest/v1/clients?select=*&id=in.({})", list);
        self.select(&path).await
    }

    pub async fn work_schedules(&self) -> Result<Vec<EmployeeWorkSchedule>, AppError> {
        self.select("/rest/v1/employee_work_schedules?select=*").await
    }

    pub async fn schedule_exceptions_on(&self, date: NaiveDate) -> Result<Vec<ScheduleException>, AppError> {
        let path = format!("/rest/v1/schedule_exceptions?select=*&exception_date=eq.{}", date);
        self.select(&path).await
    }

    pub async fn service_catalog(&self) -> Result<Vec<ServiceCatalogItem>, AppError> {
        self.select("/rest/v1/service_catalog?select=*&is_active=eq.true").await
    }

    // ---------------------------------------------------------------------
    // metrics and money
    // ---------------------------------------------------------------------

    /// Inclusive on both dates.
    pub async fn employee_performance_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EmployeePerformance>, AppError> {
        let path = format!(
            "/rest/v1/employee_performance?select=*&performance_date=gte.{}&performance_date=lte.{}&order=performance_date.asc",
            from, to
        );
        self.select(&path).await
    }

    pub async fn transactions_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<FinancialTransaction>, AppError> {
        let path = format!(
            "/rest/v1/financial_transactions?select=*&transaction_date=gte.{}&transaction_date=lt.{}",
            ts(from),
            ts(to)
        );
        self.select(&path).await
    }

    pub async fn feedback_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ClientFeedback>, AppError> {
        let path = format!(
            "/rest/v1/client_feedback?select=*&created_at=gte.{}&created_at=lt.{}",
            ts(from),
            ts(to)
        );
        self.select(&path).await
    }

    pub async fn equipment_usage_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EquipmentUsage>, AppError> {
        let path = format!(
            "/rest/v1/equipment_usage?select=*&usage_start=gte.{}&usage_start=lt.{}",
            ts(from),
            ts(to)
        );
        self.select(&path).await
    }
}
