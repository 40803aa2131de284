use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    body::Body,
};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_config::AppConfig;

use crate::jwt::validate_token;

/// Roles allowed to create bookings on behalf of clients.
pub const BOOKING_ROLES: &[&str] = &[
    "junior", "junior_associate", "associate", "manager", "team_leader", "partner", "reception",
];

/// Roles allowed to change other employees' targets.
pub const MANAGEMENT_ROLES: &[&str] = &["manager", "team_leader", "partner"];

pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    let token = auth_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    let user = validate_token(token, &config.supabase_jwt_secret)
        .map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

pub fn require_staff_role(user: &User, roles: &[&str]) -> Result<(), AppError> {
    if user.has_any_role(roles) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Role '{}' is not allowed to perform this action",
            user.role.as_deref().unwrap_or("none")
        )))
    }
}
