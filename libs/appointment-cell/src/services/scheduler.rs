// libs/appointment-cell/src/services/scheduler.rs
use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use shared_config::{AppConfig, SchedulingSettings};
use shared_database::ClinicRepository;
use shared_models::clinic::{AppointmentType, Client, Employee};
use shared_models::error::AppError;

use crate::models::{
    BoardAppointment, BoardRoom, SchedulerBoard, SchedulerStats, SlotRequest, TherapistAvailability,
};
use crate::services::slots::{
    booked_minutes, employee_is_free, format_clock, generate_timeslots, opening_window,
    room_is_free, suggest_slots, within_working_hours,
};
use crate::services::snapshot::DaySnapshot;

const BOARD_SUGGESTIONS: usize = 3;

pub struct SchedulerBoardService {
    repo: ClinicRepository,
    settings: SchedulingSettings,
}

impl SchedulerBoardService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            repo: ClinicRepository::new(config),
            settings: config.scheduling.clone(),
        }
    }

    pub async fn board(&self, date: NaiveDate, requested_type: Option<&str>) -> Result<SchedulerBoard, AppError> {
        let snapshot = DaySnapshot::load(&self.repo, date).await?;

        let mut client_ids: Vec<Uuid> = snapshot.appointments.iter().map(|apt| apt.client_id).collect();
        client_ids.sort();
        client_ids.dedup();
        let clients = self.repo.clients_by_ids(&client_ids).await?;

        let appointment_type = requested_type
            .and_then(AppointmentType::parse_loose)
            .unwrap_or(AppointmentType::Consultation);

        debug!(
            "Scheduler board for {}: {} appointments, {} clients",
            date,
            snapshot.appointments.len(),
            clients.len()
        );
        Ok(assemble_board(date, &snapshot, &clients, &self.settings, appointment_type, Utc::now()))
    }
}

/// Booked share of the available room-minutes, as a percentage with one decimal.
pub fn utilization_percent(booked_minutes: i64, available_minutes: i64) -> f64 {
    if available_minutes <= 0 {
        return 0.0;
    }
    (booked_minutes as f64 / available_minutes as f64 * 1000.0).round() / 10.0
}

fn is_rostered(employee: &Employee, date: NaiveDate, snapshot: &DaySnapshot) -> bool {
    let weekday = date.weekday().num_days_from_sunday() as i32;
    snapshot
        .schedules
        .iter()
        .any(|s| s.employee_id == employee.id && s.weekday == weekday)
}

/// Builds the board from loaded rows. `now` only matters when `date` is
/// today: therapists are then looked up from the current time onwards.
pub fn assemble_board(
    date: NaiveDate,
    snapshot: &DaySnapshot,
    clients: &[Client],
    settings: &SchedulingSettings,
    appointment_type: AppointmentType,
    now: DateTime<Utc>,
) -> SchedulerBoard {
    let step = Duration::minutes(settings.slot_minutes.max(1) as i64);
    let grid = generate_timeslots(date, settings.open_hour, settings.close_hour, settings.slot_minutes);
    let (open, close) = opening_window(date, settings);
    let open_minutes = (close - open).num_minutes().max(1);

    let active: Vec<_> = snapshot.appointments.iter().filter(|apt| apt.is_active()).cloned().collect();
    let open_rooms: Vec<_> = snapshot.rooms.iter().filter(|room| room.is_available()).collect();
    let staff: Vec<_> = snapshot.employees.iter().filter(|e| e.is_active()).collect();

    let available_slots = grid
        .iter()
        .map(|start| {
            open_rooms
                .iter()
                .filter(|room| room_is_free(*start, *start + step, room.id, &active))
                .count()
        })
        .sum();

    let active_therapists = staff
        .iter()
        .filter(|e| active.iter().any(|apt| apt.employee_id == e.id) || is_rostered(e, date, snapshot))
        .count();

    let room_minutes: i64 = open_rooms.iter().map(|room| booked_minutes(room.id, &active, open, close)).sum();
    let utilization = utilization_percent(room_minutes, open_minutes * open_rooms.len() as i64);

    let search_from = if now.date_naive() == date { now } else { open };
    let therapists = staff
        .iter()
        .map(|employee| {
            let next = grid.iter().find(|start| {
                **start >= search_from
                    && employee_is_free(**start, **start + step, employee.id, &active)
                    && within_working_hours(employee.id, **start, **start + step, &snapshot.schedules, &snapshot.exceptions)
            });
            TherapistAvailability {
                id: employee.id,
                name: employee.full_name.clone(),
                role: employee.role.display_name().to_string(),
                available: next.is_some(),
                next_available: next.map(|start| format_clock(*start)),
            }
        })
        .collect();

    let client_names: HashMap<Uuid, &str> = clients.iter().map(|c| (c.id, c.full_name.as_str())).collect();
    let employee_names: HashMap<Uuid, &str> =
        snapshot.employees.iter().map(|e| (e.id, e.full_name.as_str())).collect();
    let room_names: HashMap<Uuid, &str> = snapshot.rooms.iter().map(|r| (r.id, r.room_name.as_str())).collect();

    let mut ordered = snapshot.appointments.clone();
    ordered.sort_by_key(|apt| apt.scheduled_start);
    let appointments = ordered
        .iter()
        .map(|apt| BoardAppointment {
            id: apt.id,
            time: format_clock(apt.scheduled_start),
            patient: client_names.get(&apt.client_id).copied().unwrap_or("Unknown client").to_string(),
            therapist: employee_names.get(&apt.employee_id).copied().unwrap_or("Unassigned").to_string(),
            room: apt.room_id.and_then(|id| room_names.get(&id).map(|name| name.to_string())),
            room_id: apt.room_id,
            appointment_type: apt.appointment_type.label().to_string(),
            duration: apt.duration_minutes(),
            status: apt.status().to_string(),
        })
        .collect();

    let rooms = snapshot
        .rooms
        .iter()
        .map(|room| BoardRoom {
            id: room.id,
            name: room.room_name.clone(),
            status: if room.is_available() { "active" } else { "inactive" }.to_string(),
            utilization: utilization_percent(booked_minutes(room.id, &active, open, close), open_minutes),
        })
        .collect();

    let slot_request = SlotRequest {
        date,
        appointment_type,
        duration_minutes: settings.slot_minutes as i64,
        employee_id: None,
        room_id: None,
        preferred_time: None,
        limit: BOARD_SUGGESTIONS,
    };
    let suggestions = suggest_slots(&slot_request, &snapshot.context(settings));

    SchedulerBoard {
        date,
        stats: SchedulerStats {
            bookings: active.len(),
            available_slots,
            active_therapists,
            utilization,
        },
        therapists,
        appointments,
        rooms,
        suggestions,
    }
}
