//! Heuristic slot search: walk the day's grid, keep the slots where therapist
//! and room are both free, the therapist is rostered, and the room policies
//! hold, then rank what is left.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use shared_config::SchedulingSettings;
use shared_models::clinic::{Appointment, Employee, EmployeeWorkSchedule, Room, ScheduleException};

use crate::models::{SlotRequest, SlotSuggestion};

const BASE_CONFIDENCE: i32 = 70;
const SPECIALIZATION_BONUS: i32 = 15;
const SPARE_ROOM_BONUS: i32 = 10;
const SPARE_ROOM_THRESHOLD: f64 = 0.6;
const PENALTY_PER_HOUR: i32 = 5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstraintViolation {
    #[error("{owner} already holds {share:.0}% of {room}")]
    OwnerShareExceeded { owner: String, room: String, share: f64 },

    #[error("{employee} already holds {share:.0}% of {room}")]
    SharerShareExceeded { employee: String, room: String, share: f64 },

    #[error("{employee} may not book dedicated room {room}")]
    NotPermitted { employee: String, room: String },

    #[error("{employee} already works in {rooms} rooms today")]
    JuniorRoomLimit { employee: String, rooms: usize },
}

/// Everything the engine needs about one day.
pub struct SchedulingContext<'a> {
    pub settings: &'a SchedulingSettings,
    pub employees: &'a [Employee],
    pub rooms: &'a [Room],
    pub booked: &'a [Appointment],
    pub schedules: &'a [EmployeeWorkSchedule],
    pub exceptions: &'a [ScheduleException],
}

pub fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

pub fn opening_window(date: NaiveDate, settings: &SchedulingSettings) -> (DateTime<Utc>, DateTime<Utc>) {
    let day = midnight(date);
    (
        day + Duration::hours(settings.open_hour as i64),
        day + Duration::hours(settings.close_hour as i64),
    )
}

pub fn format_clock(at: DateTime<Utc>) -> String {
    at.format("%-I:%M %p").to_string()
}

/// Slot starts from opening (inclusive) to closing (exclusive).
pub fn generate_timeslots(date: NaiveDate, open_hour: u32, close_hour: u32, slot_minutes: u32) -> Vec<DateTime<Utc>> {
    let day = midnight(date);
    let step = slot_minutes.max(1) as usize;
    (open_hour * 60..close_hour * 60)
        .step_by(step)
        .map(|minute| day + Duration::minutes(minute as i64))
        .collect()
}

/// False when an active booking overlaps the slot and shares the therapist
/// or the room.
pub fn is_available(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    employee_id: Uuid,
    room_id: Uuid,
    booked: &[Appointment],
) -> bool {
    !booked.iter().any(|apt| {
        apt.is_active()
            && apt.overlaps(start, end)
            && (apt.employee_id == employee_id || apt.room_id == Some(room_id))
    })
}

pub fn employee_is_free(start: DateTime<Utc>, end: DateTime<Utc>, employee_id: Uuid, booked: &[Appointment]) -> bool {
    !booked
        .iter()
        .any(|apt| apt.is_active() && apt.employee_id == employee_id && apt.overlaps(start, end))
}

pub fn room_is_free(start: DateTime<Utc>, end: DateTime<Utc>, room_id: Uuid, booked: &[Appointment]) -> bool {
    !booked
        .iter()
        .any(|apt| apt.is_active() && apt.room_id == Some(room_id) && apt.overlaps(start, end))
}

pub fn within_working_hours(
    employee_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    schedules: &[EmployeeWorkSchedule],
    exceptions: &[ScheduleException],
) -> bool {
    let date = start.date_naive();
    let (from, to) = (start.time(), end.time());

    let todays_exceptions: Vec<&ScheduleException> = exceptions
        .iter()
        .filter(|ex| ex.employee_id == employee_id && ex.exception_date == date)
        .collect();

    for ex in todays_exceptions.iter().filter(|ex| !ex.is_available) {
        let hits = match (ex.start_time, ex.end_time) {
            (Some(off_from), Some(off_to)) => off_from < to && off_to > from,
            _ => true,
        };
        if hits {
            return false;
        }
    }

    let extra_shift = todays_exceptions.iter().filter(|ex| ex.is_available).any(|ex| {
        match (ex.start_time, ex.end_time) {
            (Some(on_from), Some(on_to)) => on_from <= from && on_to >= to,
            _ => true,
        }
    });
    if extra_shift {
        return true;
    }

    let rows: Vec<&EmployeeWorkSchedule> = schedules.iter().filter(|s| s.employee_id == employee_id).collect();
    if rows.is_empty() {
        // no roster: works whenever the clinic is open
        return true;
    }

    let weekday = date.weekday().num_days_from_sunday() as i32;
    rows.iter()
        .any(|s| s.weekday == weekday && s.start_time <= from && s.end_time >= to)
}

pub fn check_constraints(
    employee: &Employee,
    room: &Room,
    booked: &[Appointment],
    settings: &SchedulingSettings,
) -> Result<(), ConstraintViolation> {
    if let Some(policy) = settings.dedicated_room(&room.room_name) {
        let in_room: Vec<&Appointment> = booked
            .iter()
            .filter(|apt| apt.is_active() && apt.room_id == Some(room.id))
            .collect();
        let total = in_room.len();
        let share = if total == 0 {
            0.0
        } else {
            in_room.iter().filter(|apt| apt.employee_id == employee.id).count() as f64 / total as f64
        };

        if employee.full_name == policy.owner {
            if total == 0 || share < policy.owner_max_share {
                return Ok(());
            }
            return Err(ConstraintViolation::OwnerShareExceeded {
                owner: employee.full_name.clone(),
                room: room.room_name.clone(),
                share: share * 100.0,
            });
        }

        if policy.sharers.iter().any(|name| name == &employee.full_name) {
            if total == 0 || share < policy.sharer_max_share {
                return Ok(());
            }
            return Err(ConstraintViolation::SharerShareExceeded {
                employee: employee.full_name.clone(),
                room: room.room_name.clone(),
                share: share * 100.0,
            });
        }

        return Err(ConstraintViolation::NotPermitted {
            employee: employee.full_name.clone(),
            room: room.room_name.clone(),
        });
    }

    if employee.role.is_junior() {
        let rooms_worked: HashSet<Uuid> = booked
            .iter()
            .filter(|apt| apt.is_active() && apt.employee_id == employee.id)
            .filter_map(|apt| apt.room_id)
            .collect();
        if rooms_worked.len() >= settings.junior_max_rooms && !rooms_worked.contains(&room.id) {
            return Err(ConstraintViolation::JuniorRoomLimit {
                employee: employee.full_name.clone(),
                rooms: rooms_worked.len(),
            });
        }
    }

    Ok(())
}

/// Minutes of active bookings in `room_id` that fall inside the window.
pub fn booked_minutes(room_id: Uuid, booked: &[Appointment], from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    booked
        .iter()
        .filter(|apt| apt.is_active() && apt.room_id == Some(room_id))
        .map(|apt| apt.minutes_within(from, to))
        .sum()
}

fn score(
    employee: &Employee,
    room: &Room,
    start: DateTime<Utc>,
    request: &SlotRequest,
    ctx: &SchedulingContext<'_>,
) -> (u8, String) {
    let mut confidence = BASE_CONFIDENCE;
    let mut reasons = Vec::new();

    if employee.specializes_in(request.appointment_type) {
        confidence += SPECIALIZATION_BONUS;
        reasons.push(format!("Specialises in {}", request.appointment_type.label().to_lowercase()));
    }

    let (open, close) = opening_window(request.date, ctx.settings);
    let open_minutes = (close - open).num_minutes().max(1);
    let room_share = booked_minutes(room.id, ctx.booked, open, close) as f64 / open_minutes as f64;
    if room_share < SPARE_ROOM_THRESHOLD {
        confidence += SPARE_ROOM_BONUS;
        reasons.push(format!("{} has spare capacity", room.room_name));
    }

    if let Some(preferred) = request.preferred_time {
        let preferred_at = midnight(request.date) + (preferred - NaiveTime::MIN);
        let hours_off = (start - preferred_at).num_minutes().abs() / 60;
        confidence -= PENALTY_PER_HOUR * hours_off as i32;
        if hours_off == 0 {
            reasons.push("Matches preferred time".to_string());
        }
    }

    if reasons.is_empty() {
        reasons.push("Earliest available slot".to_string());
    }

    (confidence.clamp(0, 100) as u8, reasons.join("; "))
}

/// Ranked free slots for the request: at most one room per therapist and
/// start time, ordered by confidence then start.
pub fn suggest_slots(request: &SlotRequest, ctx: &SchedulingContext<'_>) -> Vec<SlotSuggestion> {
    if !(1..=ctx.settings.open_minutes_per_day()).contains(&request.duration_minutes) {
        return Vec::new();
    }
    let duration = Duration::minutes(request.duration_minutes);
    let (_, close) = opening_window(request.date, ctx.settings);

    let employees: Vec<&Employee> = ctx
        .employees
        .iter()
        .filter(|e| e.is_active() && request.employee_id.map_or(true, |id| id == e.id))
        .collect();
    let rooms: Vec<&Room> = ctx
        .rooms
        .iter()
        .filter(|r| r.is_available() && request.room_id.map_or(true, |id| id == r.id))
        .collect();

    let mut suggestions = Vec::new();

    for start in generate_timeslots(
        request.date,
        ctx.settings.open_hour,
        ctx.settings.close_hour,
        ctx.settings.slot_minutes,
    ) {
        let Some(end) = start.checked_add_signed(duration) else {
            continue;
        };
        if end > close {
            continue;
        }

        for employee in &employees {
            if !within_working_hours(employee.id, start, end, ctx.schedules, ctx.exceptions) {
                continue;
            }

            let mut best: Option<(&Room, u8, String)> = None;
            for room in &rooms {
                if !is_available(start, end, employee.id, room.id, ctx.booked) {
                    continue;
                }
                if check_constraints(employee, room, ctx.booked, ctx.settings).is_err() {
                    continue;
                }
                let (confidence, reason) = score(employee, room, start, request, ctx);
                if best.as_ref().map_or(true, |(_, top, _)| confidence > *top) {
                    best = Some((room, confidence, reason));
                }
            }

            if let Some((room, confidence, reason)) = best {
                suggestions.push(SlotSuggestion {
                    employee_id: employee.id,
                    therapist: employee.full_name.clone(),
                    room_id: room.id,
                    room: room.room_name.clone(),
                    start,
                    end,
                    time: format_clock(start),
                    confidence,
                    reason,
                });
            }
        }
    }

    suggestions.sort_by(|a, b| b.confidence.cmp(&a.confidence).then(a.start.cmp(&b.start)));
    suggestions.truncate(request.limit);
    suggestions
}
