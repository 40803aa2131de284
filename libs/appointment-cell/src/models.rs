// libs/appointment-cell/src/models.rs
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::clinic::{Appointment, AppointmentStatus, AppointmentType};
use shared_models::error::AppError;

// ==============================================================================
// BOOKING REQUESTS
// ==============================================================================

/// Front-desk booking: room and time are chosen by the caller, only
/// conflicts are checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualBookingRequest {
    pub employee_id: Uuid,
    pub client_id: Uuid,
    pub room_id: Uuid,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub base_price: f64,
    pub discount_amount: Option<f64>,
    pub session_notes: Option<String>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartBookingRequest {
    pub client_id: Uuid,
    pub date: NaiveDate,
    pub appointment_type: AppointmentType,
    pub duration_minutes: Option<i64>,
    pub employee_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub preferred_time: Option<NaiveTime>,
    pub base_price: Option<f64>,
    pub session_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionQuery {
    pub date: NaiveDate,
    pub appointment_type: String,
    pub employee_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub duration_minutes: Option<i64>,
    pub preferred_time: Option<NaiveTime>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerQuery {
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub appointment_type: Option<String>,
}

// ==============================================================================
// SLOT ENGINE
// ==============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SlotRequest {
    pub date: NaiveDate,
    pub appointment_type: AppointmentType,
    pub duration_minutes: i64,
    pub employee_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub preferred_time: Option<NaiveTime>,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlotSuggestion {
    pub employee_id: Uuid,
    pub therapist: String,
    pub room_id: Uuid,
    pub room: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub time: String,
    pub confidence: u8,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartBookingResponse {
    pub appointment: Appointment,
    pub chosen: SlotSuggestion,
    pub alternatives: Vec<SlotSuggestion>,
}

// ==============================================================================
// SCHEDULER BOARD
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStats {
    pub bookings: usize,
    pub available_slots: usize,
    pub active_therapists: usize,
    pub utilization: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TherapistAvailability {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub role: String,
    pub available: bool,
    pub next_available: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardAppointment {
    pub id: Uuid,
    pub time: String,
    pub patient: String,
    pub therapist: String,
    pub room: Option<String>,
    pub room_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub appointment_type: String,
    pub duration: i64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardRoom {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub utilization: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulerBoard {
    pub date: NaiveDate,
    pub stats: SchedulerStats,
    pub therapists: Vec<TherapistAvailability>,
    pub appointments: Vec<BoardAppointment>,
    pub rooms: Vec<BoardRoom>,
    pub suggestions: Vec<SlotSuggestion>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Unknown appointment type: {0}")]
    UnknownType(String),

    #[error("Room is already booked for this timeslot.")]
    RoomConflict,

    #[error("Therapist is already booked for this timeslot.")]
    TherapistConflict,

    #[error("No available slot found.")]
    NoSlotAvailable,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidTime(msg) => AppError::ValidationError(msg),
            BookingError::InvalidPrice(msg) => AppError::ValidationError(msg),
            BookingError::UnknownType(_) => AppError::BadRequest(err.to_string()),
            BookingError::RoomConflict | BookingError::TherapistConflict => {
                AppError::Conflict(err.to_string())
            }
            BookingError::NoSlotAvailable => AppError::BadRequest(err.to_string()),
            BookingError::Store(inner) => inner,
        }
    }
}
