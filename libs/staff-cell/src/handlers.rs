// =====================================================================================
// STAFF CELL HANDLERS
// =====================================================================================

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use analytics_cell::RangeQuery;
use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::{require_staff_role, MANAGEMENT_ROLES};

use crate::models::{CompensationReport, EmployeeAdvice, EmployeeListing, TargetRequest, TargetResponse};
use crate::services::{StaffService, TargetStore};

/// Advice looks at the week ending `to` unless `from` is given.
const ADVICE_DAYS: i64 = 7;

#[derive(Clone)]
pub struct StaffState {
    pub config: Arc<AppConfig>,
    pub targets: Arc<TargetStore>,
}

impl StaffState {
    fn service(&self) -> StaffService {
        StaffService::new(&self.config, self.targets.clone())
    }
}

#[instrument(skip(state))]
pub async fn list_employees(State(state): State<StaffState>) -> Result<Json<Vec<EmployeeListing>>, AppError> {
    Ok(Json(state.service().employees().await?))
}

#[instrument(skip(state))]
pub async fn employee_advice(
    State(state): State<StaffState>,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<EmployeeAdvice>, AppError> {
    let (from, to) = query.resolve_days(ADVICE_DAYS)?;
    Ok(Json(state.service().advice(employee_id, from, to).await?))
}

#[axum::debug_handler]
pub async fn set_target(
    State(state): State<StaffState>,
    Extension(user): Extension<User>,
    Path(employee_id): Path<Uuid>,
    Json(request): Json<TargetRequest>,
) -> Result<Json<TargetResponse>, AppError> {
    require_staff_role(&user, MANAGEMENT_ROLES)?;
    info!("{} is setting the target for {}", user.id, employee_id);

    Ok(Json(state.service().set_target(employee_id, request.target).await?))
}

#[instrument(skip(state))]
pub async fn get_compensation(
    State(state): State<StaffState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<CompensationReport>, AppError> {
    let (from, to) = query.resolve()?;
    Ok(Json(state.service().compensation(from, to).await?))
}
