// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::info;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::{require_staff_role, BOOKING_ROLES};

use crate::models::{ManualBookingRequest, SchedulerQuery, SmartBookingRequest, SuggestionQuery};
use crate::services::booking::validate_date;
use crate::services::{BookingService, SchedulerBoardService};

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn manual_book(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<ManualBookingRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_staff_role(&user, BOOKING_ROLES)?;
    info!("Manual booking by {} for client {}", user.id, request.client_id);

    let appointment = BookingService::new(&state)
        .manual_book(request, auth.token())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment,
            "message": "Appointment booked successfully"
        })),
    ))
}

#[axum::debug_handler]
pub async fn smart_book(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<SmartBookingRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_staff_role(&user, BOOKING_ROLES)?;
    info!("Smart booking by {} for client {} on {}", user.id, request.client_id, request.date);

    let booking = BookingService::new(&state)
        .smart_book(request, auth.token())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": booking.appointment,
            "chosen": booking.chosen,
            "alternatives": booking.alternatives,
            "message": format!("Booked with {} in {} at {}", booking.chosen.therapist, booking.chosen.room, booking.chosen.time)
        })),
    ))
}

// ==============================================================================
// READ-ONLY HANDLERS
// ==============================================================================

pub async fn suggestions(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Value>, AppError> {
    let date = query.date;
    let suggestions = BookingService::new(&state).suggestions(query).await?;

    Ok(Json(json!({
        "date": date,
        "suggestions": suggestions,
        "total": suggestions.len()
    })))
}

pub async fn scheduler_board(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<SchedulerQuery>,
) -> Result<Json<Value>, AppError> {
    let date = query
        .date
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .filter(|date| validate_date(*date).is_ok())
        .ok_or_else(|| AppError::BadRequest("Missing or invalid date, expected YYYY-MM-DD".to_string()))?;

    let board = SchedulerBoardService::new(&state)
        .board(date, query.appointment_type.as_deref())
        .await?;

    Ok(Json(json!(board)))
}
