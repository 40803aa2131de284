use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by Supabase-issued access tokens. Staff roles are read
/// from `app_metadata.staff_role` when present, falling back to `role`.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

impl JwtClaims {
    pub fn staff_role(&self) -> Option<String> {
        self.app_metadata
            .as_ref()
            .and_then(|meta| meta.get("staff_role"))
            .and_then(|role| role.as_str())
            .map(str::to_string)
            .or_else(|| self.role.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        self.is_admin()
            || self
                .role
                .as_deref()
                .map(|role| roles.contains(&role))
                .unwrap_or(false)
    }
}
