// libs/shared/models/src/clinic.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ==============================================================================
// ENUMS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    #[serde(alias = "physio")]
    Physiotherapy,
    Massage,
    #[serde(alias = "gym", alias = "rehab")]
    GymSession,
    Consultation,
    #[serde(alias = "followup")]
    FollowUp,
}

impl AppointmentType {
    pub const ALL: [AppointmentType; 5] = [
        AppointmentType::Physiotherapy,
        AppointmentType::Massage,
        AppointmentType::GymSession,
        AppointmentType::Consultation,
        AppointmentType::FollowUp,
    ];

    /// Short label used on the scheduler board.
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentType::Physiotherapy => "Physio",
            AppointmentType::Massage => "Massage",
            AppointmentType::GymSession => "Gym Session",
            AppointmentType::Consultation => "Consultation",
            AppointmentType::FollowUp => "Follow-up",
        }
    }

    /// Lenient parse for the loose strings the dashboard sends
    /// ("physio", "Massage", "gym_session", ...).
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "physio" | "physiotherapy" => Some(AppointmentType::Physiotherapy),
            "massage" | "massage_therapy" => Some(AppointmentType::Massage),
            "gym" | "gym_session" | "rehab" => Some(AppointmentType::GymSession),
            "consultation" | "chiro" => Some(AppointmentType::Consultation),
            "follow_up" | "followup" => Some(AppointmentType::FollowUp),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::Physiotherapy => write!(f, "physiotherapy"),
            AppointmentType::Massage => write!(f, "massage"),
            AppointmentType::GymSession => write!(f, "gym_session"),
            AppointmentType::Consultation => write!(f, "consultation"),
            AppointmentType::FollowUp => write!(f, "follow_up"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    Junior,
    JuniorAssociate,
    Associate,
    Manager,
    TeamLeader,
    Partner,
}

impl EmployeeRole {
    /// Juniors are paid a fixed salary and are limited in how many rooms
    /// they may work across in a day.
    pub fn is_junior(&self) -> bool {
        matches!(self, EmployeeRole::Junior | EmployeeRole::JuniorAssociate)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            EmployeeRole::Junior => "Junior",
            EmployeeRole::JuniorAssociate => "Junior Associate",
            EmployeeRole::Associate => "Associate",
            EmployeeRole::Manager => "Manager",
            EmployeeRole::TeamLeader => "Team Leader",
            EmployeeRole::Partner => "Partner",
        }
    }
}

impl fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl PaymentStatus {
    pub fn is_outstanding(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Overdue)
    }
}

// ==============================================================================
// TABLE ROWS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub appointment_code: String,
    pub appointment_type: AppointmentType,
    pub base_price: f64,
    pub discount_amount: Option<f64>,
    pub final_price: f64,
    pub client_id: Uuid,
    pub employee_id: Uuid,
    pub room_id: Option<Uuid>,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub session_notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    pub fn status(&self) -> AppointmentStatus {
        self.status.unwrap_or_default()
    }

    /// Scheduled and completed appointments hold their slot; cancelled and
    /// no-show ones do not.
    pub fn is_active(&self) -> bool {
        matches!(
            self.status(),
            AppointmentStatus::Scheduled | AppointmentStatus::Completed
        )
    }

    pub fn is_completed(&self) -> bool {
        self.status() == AppointmentStatus::Completed
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.scheduled_end - self.scheduled_start).num_minutes().max(0)
    }

    /// Half-open overlap: back-to-back sessions do not collide.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.scheduled_start < end && self.scheduled_end > start
    }

    /// Minutes of this booking that fall inside `[from, to)`.
    pub fn minutes_within(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
        let start = self.scheduled_start.max(from);
        let end = self.scheduled_end.min(to);
        (end - start).num_minutes().max(0)
    }

    pub fn scheduled_date(&self) -> NaiveDate {
        self.scheduled_start.date_naive()
    }

    /// Booked on the same calendar day it takes place.
    pub fn is_walk_in(&self) -> bool {
        self.created_at
            .map(|created| created.date_naive() == self.scheduled_date())
            .unwrap_or(false)
    }

    pub fn is_outstanding(&self) -> bool {
        self.payment_status
            .map(|status| status.is_outstanding())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAppointment {
    pub appointment_code: String,
    pub appointment_type: AppointmentType,
    pub base_price: f64,
    pub discount_amount: Option<f64>,
    pub final_price: f64,
    pub client_id: Uuid,
    pub employee_id: Uuid,
    pub room_id: Option<Uuid>,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub payment_status: PaymentStatus,
    pub session_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: Uuid,
    pub client_code: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub first_visit_date: Option<NaiveDate>,
    pub last_visit_date: Option<NaiveDate>,
    pub insurance_provider: Option<String>,
    pub medical_notes: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: Uuid,
    pub employee_code: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: EmployeeRole,
    pub hire_date: NaiveDate,
    pub base_salary: Option<f64>,
    pub commission_rate: Option<f64>,
    pub specializations: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }

    pub fn specializes_in(&self, appointment_type: AppointmentType) -> bool {
        let wanted = appointment_type.to_string();
        let label = appointment_type.label().to_lowercase();
        self.specializations
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .any(|s| s.contains(&wanted) || s.contains(&label) || wanted.contains(&s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: Uuid,
    pub room_name: String,
    pub room_number: String,
    pub capacity: Option<i32>,
    pub equipment: Option<Vec<String>>,
    pub hourly_cost: Option<f64>,
    pub is_available: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Room {
    pub fn is_available(&self) -> bool {
        self.is_available.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeePerformance {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub performance_date: NaiveDate,
    pub appointments_completed: Option<i32>,
    pub client_satisfaction_avg: Option<f64>,
    pub commission_earned: Option<f64>,
    pub hours_worked: Option<f64>,
    pub retention_factor: Option<f64>,
    pub revenue_generated: Option<f64>,
    pub salary_component: Option<f64>,
    pub total_compensation: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialTransaction {
    pub id: Uuid,
    pub amount: f64,
    pub appointment_id: Option<Uuid>,
    pub transaction_type: String,
    pub transaction_date: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Payment,
    Refund,
    Expense,
}

impl FinancialTransaction {
    pub fn kind(&self) -> TransactionKind {
        match self.transaction_type.trim().to_lowercase().as_str() {
            "payment" => TransactionKind::Payment,
            "refund" => TransactionKind::Refund,
            _ => TransactionKind::Expense,
        }
    }

    pub fn booked_at(&self) -> Option<DateTime<Utc>> {
        self.transaction_date.or(self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceCatalogItem {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub base_price: f64,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleException {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub exception_date: NaiveDate,
    pub is_available: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Weekly working hours; `weekday` counts from 0 = Sunday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeWorkSchedule {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub weekday: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientFeedback {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub client_id: Uuid,
    pub employee_id: Uuid,
    pub rating: Option<i32>,
    pub feedback_text: Option<String>,
    pub would_recommend: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquipmentUsage {
    pub id: Uuid,
    pub equipment_name: String,
    pub room_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub usage_start: DateTime<Utc>,
    pub usage_end: Option<DateTime<Utc>>,
    pub maintenance_cost: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn appointment(start_hour: u32, end_hour: u32, status: Option<AppointmentStatus>) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            appointment_code: "APT-1".into(),
            appointment_type: AppointmentType::Physiotherapy,
            base_price: 150.0,
            discount_amount: None,
            final_price: 150.0,
            client_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            room_id: None,
            scheduled_start: Utc.with_ymd_and_hms(2025, 3, 3, start_hour, 0, 0).unwrap(),
            scheduled_end: Utc.with_ymd_and_hms(2025, 3, 3, end_hour, 0, 0).unwrap(),
            actual_start: None,
            actual_end: None,
            status,
            payment_status: None,
            session_notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn back_to_back_sessions_do_not_overlap() {
        let apt = appointment(9, 10, None);
        let ten = Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap();
        let eleven = Utc.with_ymd_and_hms(2025, 3, 3, 11, 0, 0).unwrap();
        assert!(!apt.overlaps(ten, eleven));
        assert!(apt.overlaps(ten - chrono::Duration::minutes(1), eleven));
    }

    #[test]
    fn minutes_are_clipped_to_window() {
        let apt = appointment(9, 11, None);
        let ten = Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap();
        let noon = Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap();
        assert_eq!(apt.minutes_within(ten, noon), 60);
        assert_eq!(apt.minutes_within(noon, noon + chrono::Duration::hours(1)), 0);
    }

    #[test]
    fn null_status_counts_as_scheduled() {
        assert!(appointment(9, 10, None).is_active());
        assert!(!appointment(9, 10, Some(AppointmentStatus::NoShow)).is_active());
        assert!(!appointment(9, 10, Some(AppointmentStatus::Cancelled)).is_active());
    }

    #[test]
    fn enums_use_schema_spelling() {
        assert_eq!(json!(AppointmentStatus::NoShow), json!("no_show"));
        assert_eq!(json!(EmployeeRole::TeamLeader), json!("team_leader"));
        assert_eq!(json!(AppointmentType::GymSession), json!("gym_session"));
    }

    #[test]
    fn loose_type_parsing_accepts_dashboard_labels() {
        assert_eq!(AppointmentType::parse_loose("physio"), Some(AppointmentType::Physiotherapy));
        assert_eq!(AppointmentType::parse_loose("Gym Session"), Some(AppointmentType::GymSession));
        assert_eq!(AppointmentType::parse_loose("yoga"), None);
    }

    #[test]
    fn unknown_transaction_types_are_expenses() {
        let tx: FinancialTransaction = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "amount": 120.0,
            "appointment_id": null,
            "transaction_type": "rent",
            "transaction_date": "2025-03-03T09:00:00Z",
            "payment_method": null,
            "reference_number": null,
            "notes": null,
            "created_at": null
        }))
        .unwrap();
        assert_eq!(tx.kind(), TransactionKind::Expense);
    }

    #[test]
    fn blank_specializations_match_nothing() {
        let employee: Employee = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "employee_code": "EMP-1",
            "full_name": "Mike Torres",
            "email": "mike@clinic.test",
            "role": "associate",
            "hire_date": "2023-01-01",
            "specializations": ["", "  ", "Massage"]
        }))
        .unwrap();

        assert!(employee.specializes_in(AppointmentType::Massage));
        assert!(!employee.specializes_in(AppointmentType::Physiotherapy));
        assert!(!employee.specializes_in(AppointmentType::GymSession));
    }
}
