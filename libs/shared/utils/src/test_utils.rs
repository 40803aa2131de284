use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::{AppConfig, SchedulingSettings, TargetSettings};
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            supabase_url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            server_port: 3000,
            scheduling: SchedulingSettings::default(),
            targets: TargetSettings::default(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "staff@clinic.test".to_string(),
            role: "associate".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn associate(email: &str) -> Self {
        Self::new(email, "associate")
    }

    pub fn manager(email: &str) -> Self {
        Self::new(email, "manager")
    }

    pub fn partner(email: &str) -> Self {
        Self::new(email, "partner")
    }

    /// Authenticated, but not a member of staff.
    pub fn outsider(email: &str) -> Self {
        Self::new(email, "authenticated")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": "authenticated",
            "app_metadata": { "staff_role": user.role },
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// PostgREST-shaped rows for the clinic tables.
pub struct MockClinicRows;

impl MockClinicRows {
    pub fn room(id: Uuid, name: &str) -> Value {
        json!({
            "id": id,
            "room_name": name,
            "room_number": format!("R-{}", &id.to_string()[..4]),
            "capacity": 1,
            "equipment": [],
            "hourly_cost": 25.0,
            "is_available": true,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn employee(id: Uuid, name: &str, role: &str, specializations: &[&str]) -> Value {
        json!({
            "id": id,
            "employee_code": format!("EMP-{}", &id.to_string()[..4]),
            "full_name": name,
            "email": format!("{}@clinic.test", name.to_lowercase().replace(' ', ".")),
            "phone": null,
            "role": role,
            "hire_date": "2022-01-10",
            "base_salary": if role.starts_with("junior") { json!(3000.0) } else { Value::Null },
            "commission_rate": if role.starts_with("junior") { Value::Null } else { json!(0.4) },
            "specializations": specializations,
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn client(id: Uuid, name: &str, first_visit: &str) -> Value {
        json!({
            "id": id,
            "client_code": format!("CL-{}", &id.to_string()[..4]),
            "full_name": name,
            "email": format!("{}@mail.test", name.to_lowercase().replace(' ', ".")),
            "phone": null,
            "date_of_birth": null,
            "emergency_contact": null,
            "emergency_phone": null,
            "first_visit_date": first_visit,
            "last_visit_date": null,
            "insurance_provider": null,
            "medical_notes": null,
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    /// A pre-booked, paid appointment.
    pub fn appointment(
        employee_id: Uuid,
        client_id: Uuid,
        room_id: Uuid,
        start: &str,
        end: &str,
        status: &str,
        final_price: f64,
    ) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "appointment_code": format!("APT-{}", &Uuid::new_v4().to_string()[..8]),
            "appointment_type": "physiotherapy",
            "base_price": final_price,
            "discount_amount": 0.0,
            "final_price": final_price,
            "client_id": client_id,
            "employee_id": employee_id,
            "room_id": room_id,
            "scheduled_start": start,
            "scheduled_end": end,
            "actual_start": null,
            "actual_end": null,
            "status": status,
            "payment_status": "paid",
            "session_notes": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    /// Same as [`MockClinicRows::appointment`] but booked on the day.
    pub fn walk_in_appointment(
        employee_id: Uuid,
        client_id: Uuid,
        room_id: Uuid,
        start: &str,
        end: &str,
        status: &str,
        final_price: f64,
    ) -> Value {
        let mut row = Self::appointment(employee_id, client_id, room_id, start, end, status, final_price);
        row["created_at"] = json!(start);
        row
    }

    pub fn transaction(amount: f64, transaction_type: &str, date: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "amount": amount,
            "appointment_id": null,
            "transaction_type": transaction_type,
            "transaction_date": date,
            "payment_method": "card",
            "reference_number": null,
            "notes": null,
            "created_at": date
        })
    }

    pub fn performance(
        employee_id: Uuid,
        date: &str,
        revenue: f64,
        satisfaction: f64,
        hours: f64,
        salary: f64,
        commission: f64,
    ) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "employee_id": employee_id,
            "performance_date": date,
            "appointments_completed": 4,
            "client_satisfaction_avg": satisfaction,
            "commission_earned": commission,
            "hours_worked": hours,
            "retention_factor": 0.8,
            "revenue_generated": revenue,
            "salary_component": salary,
            "total_compensation": salary + commission,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn feedback(employee_id: Uuid, client_id: Uuid, rating: i32, created_at: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "appointment_id": Uuid::new_v4(),
            "client_id": client_id,
            "employee_id": employee_id,
            "rating": rating,
            "feedback_text": null,
            "would_recommend": true,
            "created_at": created_at
        })
    }

    pub fn work_schedule(employee_id: Uuid, weekday: i32, start: &str, end: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "employee_id": employee_id,
            "weekday": weekday,
            "start_time": start,
            "end_time": end,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn schedule_exception(
        employee_id: Uuid,
        date: &str,
        is_available: bool,
        window: Option<(&str, &str)>,
    ) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "employee_id": employee_id,
            "exception_date": date,
            "is_available": is_available,
            "start_time": window.map(|(start, _)| start),
            "end_time": window.map(|(_, end)| end),
            "reason": "leave",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn service(name: &str, base_price: f64, duration_minutes: i32) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "code": name.to_uppercase(),
            "name": name,
            "description": null,
            "base_price": base_price,
            "duration_minutes": duration_minutes,
            "is_active": true,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn equipment_usage(room_id: Uuid, name: &str, start: &str, maintenance_cost: f64) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "equipment_name": name,
            "room_id": room_id,
            "appointment_id": Uuid::new_v4(),
            "usage_start": start,
            "usage_end": null,
            "maintenance_cost": maintenance_cost,
            "created_at": start
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
