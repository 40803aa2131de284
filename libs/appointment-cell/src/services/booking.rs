// libs/appointment-cell/src/services/booking.rs
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::{AppConfig, SchedulingSettings};
use shared_database::ClinicRepository;
use shared_models::clinic::{
    Appointment, AppointmentStatus, AppointmentType, NewAppointment, PaymentStatus,
};

use crate::models::{
    BookingError, ManualBookingRequest, SlotRequest, SlotSuggestion, SmartBookingRequest,
    SmartBookingResponse, SuggestionQuery,
};
use crate::services::slots::suggest_slots;
use crate::services::snapshot::DaySnapshot;

pub const DEFAULT_SUGGESTIONS: usize = 4;

pub struct BookingService {
    repo: ClinicRepository,
    settings: SchedulingSettings,
}

/// `APT-YYYYMMDD-xxxxxxxx`, the tail taken from a fresh v4 uuid.
pub fn appointment_code(start: DateTime<Utc>) -> String {
    let tail = Uuid::new_v4().simple().to_string();
    format!("APT-{}-{}", start.format("%Y%m%d"), &tail[..8])
}

pub const BOOKABLE_YEARS: std::ops::RangeInclusive<i32> = 1900..=9999;

pub fn validate_date(date: NaiveDate) -> Result<NaiveDate, BookingError> {
    if BOOKABLE_YEARS.contains(&date.year()) {
        Ok(date)
    } else {
        Err(BookingError::InvalidTime(format!("date {} is out of range", date)))
    }
}

/// A session has to fit inside one opening day.
pub fn validate_duration(minutes: i64, settings: &SchedulingSettings) -> Result<i64, BookingError> {
    let max = settings.open_minutes_per_day();
    if (1..=max).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(BookingError::InvalidTime(format!(
            "duration_minutes must be between 1 and {}",
            max
        )))
    }
}

pub fn validate_manual_request(request: &ManualBookingRequest) -> Result<(), BookingError> {
    if request.scheduled_start >= request.scheduled_end {
        return Err(BookingError::InvalidTime(
            "scheduled_start must be before scheduled_end".to_string(),
        ));
    }
    if request.base_price < 0.0 {
        return Err(BookingError::InvalidPrice("base_price cannot be negative".to_string()));
    }
    let discount = request.discount_amount.unwrap_or(0.0);
    if discount < 0.0 || discount > request.base_price {
        return Err(BookingError::InvalidPrice(
            "discount_amount must be between 0 and base_price".to_string(),
        ));
    }
    Ok(())
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            repo: ClinicRepository::new(config),
            settings: config.scheduling.clone(),
        }
    }

    pub fn with_repository(repo: ClinicRepository, settings: SchedulingSettings) -> Self {
        Self { repo, settings }
    }

    /// Book exactly what the front desk asked for, refusing overlaps.
    pub async fn manual_book(
        &self,
        request: ManualBookingRequest,
        auth_token: &str,
    ) -> Result<Appointment, BookingError> {
        validate_manual_request(&request)?;
        let repo = self.repo.for_token(auth_token);

        let (room_rows, employee_rows) = futures::try_join!(
            repo.appointments_for_room_overlapping(request.room_id, request.scheduled_start, request.scheduled_end),
            repo.appointments_for_employee_overlapping(request.employee_id, request.scheduled_start, request.scheduled_end),
        )?;

        if room_rows.iter().any(Appointment::is_active) {
            warn!("Room {} already booked at {}", request.room_id, request.scheduled_start);
            return Err(BookingError::RoomConflict);
        }
        if employee_rows.iter().any(Appointment::is_active) {
            warn!("Employee {} already booked at {}", request.employee_id, request.scheduled_start);
            return Err(BookingError::TherapistConflict);
        }

        let discount = request.discount_amount.unwrap_or(0.0);
        let new = NewAppointment {
            appointment_code: appointment_code(request.scheduled_start),
            appointment_type: request.appointment_type,
            base_price: request.base_price,
            discount_amount: request.discount_amount,
            final_price: request.base_price - discount,
            client_id: request.client_id,
            employee_id: request.employee_id,
            room_id: Some(request.room_id),
            scheduled_start: request.scheduled_start,
            scheduled_end: request.scheduled_end,
            status: request.status.unwrap_or(AppointmentStatus::Scheduled),
            payment_status: PaymentStatus::Pending,
            session_notes: request.session_notes,
        };

        let appointment = repo.insert_appointment(&new).await?;
        info!("Booked appointment {} ({})", appointment.appointment_code, appointment.id);
        Ok(appointment)
    }

    /// Let the slot engine pick therapist, room and time, then book the top
    /// suggestion.
    pub async fn smart_book(
        &self,
        request: SmartBookingRequest,
        auth_token: &str,
    ) -> Result<SmartBookingResponse, BookingError> {
        validate_date(request.date)?;
        let repo = self.repo.for_token(auth_token);
        let snapshot = DaySnapshot::load(&repo, request.date).await?;
        let catalog_entry = snapshot.catalog_entry(request.appointment_type);

        let duration_minutes = request
            .duration_minutes
            .or_else(|| catalog_entry.map(|item| item.duration_minutes as i64))
            .unwrap_or(self.settings.slot_minutes as i64);
        let duration_minutes = validate_duration(duration_minutes, &self.settings)?;

        let base_price = request
            .base_price
            .or_else(|| catalog_entry.map(|item| item.base_price))
            .unwrap_or(0.0);
        if base_price < 0.0 {
            return Err(BookingError::InvalidPrice("base_price cannot be negative".to_string()));
        }

        let slot_request = SlotRequest {
            date: request.date,
            appointment_type: request.appointment_type,
            duration_minutes,
            employee_id: request.employee_id,
            room_id: request.room_id,
            preferred_time: request.preferred_time,
            limit: DEFAULT_SUGGESTIONS,
        };

        let mut suggestions = suggest_slots(&slot_request, &snapshot.context(&self.settings)).into_iter();
        let chosen = suggestions.next().ok_or_else(|| {
            warn!("No slot for {} on {}", request.appointment_type, request.date);
            BookingError::NoSlotAvailable
        })?;
        debug!(
            "Smart booking picked {} in {} at {} ({}%)",
            chosen.therapist, chosen.room, chosen.time, chosen.confidence
        );

        let new = NewAppointment {
            appointment_code: appointment_code(chosen.start),
            appointment_type: request.appointment_type,
            base_price,
            discount_amount: None,
            final_price: base_price,
            client_id: request.client_id,
            employee_id: chosen.employee_id,
            room_id: Some(chosen.room_id),
            scheduled_start: chosen.start,
            scheduled_end: chosen.start + Duration::minutes(duration_minutes),
            status: AppointmentStatus::Scheduled,
            payment_status: PaymentStatus::Pending,
            session_notes: request.session_notes,
        };

        let appointment = repo.insert_appointment(&new).await?;
        info!("Smart-booked appointment {} with {}", appointment.appointment_code, chosen.therapist);

        Ok(SmartBookingResponse {
            appointment,
            chosen,
            alternatives: suggestions.collect(),
        })
    }

    pub async fn suggestions(&self, query: SuggestionQuery) -> Result<Vec<SlotSuggestion>, BookingError> {
        let appointment_type = AppointmentType::parse_loose(&query.appointment_type)
            .ok_or_else(|| BookingError::UnknownType(query.appointment_type.clone()))?;

        validate_date(query.date)?;
        let snapshot = DaySnapshot::load(&self.repo, query.date).await?;
        let duration_minutes = query
            .duration_minutes
            .or_else(|| snapshot.catalog_entry(appointment_type).map(|item| item.duration_minutes as i64))
            .unwrap_or(self.settings.slot_minutes as i64);
        let duration_minutes = validate_duration(duration_minutes, &self.settings)?;

        let slot_request = SlotRequest {
            date: query.date,
            appointment_type,
            duration_minutes,
            employee_id: query.employee_id,
            room_id: query.room_id,
            preferred_time: query.preferred_time,
            limit: query.limit.unwrap_or(DEFAULT_SUGGESTIONS),
        };

        Ok(suggest_slots(&slot_request, &snapshot.context(&self.settings)))
    }
}
