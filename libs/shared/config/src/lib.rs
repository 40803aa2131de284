use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub server_port: u16,
    pub scheduling: SchedulingSettings,
    pub targets: TargetSettings,
}

/// Clinic opening hours and booking rules used by the slot engine.
#[derive(Debug, Clone)]
pub struct SchedulingSettings {
    pub open_hour: u32,
    pub close_hour: u32,
    pub slot_minutes: u32,
    pub junior_max_rooms: usize,
    pub dedicated_rooms: Vec<DedicatedRoom>,
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            open_hour: 8,
            close_hour: 18,
            slot_minutes: 30,
            junior_max_rooms: 3,
            dedicated_rooms: Vec::new(),
        }
    }
}

impl SchedulingSettings {
    pub fn open_minutes_per_day(&self) -> i64 {
        (self.close_hour.saturating_sub(self.open_hour) as i64) * 60
    }

    pub fn dedicated_room(&self, room_name: &str) -> Option<&DedicatedRoom> {
        self.dedicated_rooms.iter().find(|r| r.room_name == room_name)
    }
}

/// A room owned by one therapist. The owner keeps the majority of its
/// bookings and only the listed sharers may use the rest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DedicatedRoom {
    pub room_name: String,
    pub owner: String,
    #[serde(default = "default_owner_share")]
    pub owner_max_share: f64,
    #[serde(default)]
    pub sharers: Vec<String>,
    #[serde(default = "default_sharer_share")]
    pub sharer_max_share: f64,
}

fn default_owner_share() -> f64 {
    0.7
}

fn default_sharer_share() -> f64 {
    0.3
}

#[derive(Debug, Clone)]
pub struct TargetSettings {
    pub daily_revenue: f64,
    pub daily_ebita: f64,
    pub employee_revenue: f64,
    pub no_show_rate: f64,
    pub industry_avg_margin: f64,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            daily_revenue: 4000.0,
            daily_ebita: 1500.0,
            employee_revenue: 9000.0,
            no_show_rate: 5.0,
            industry_avg_margin: 35.0,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let scheduling_defaults = SchedulingSettings::default();
        let target_defaults = TargetSettings::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            server_port: parse_var("SERVER_PORT", 3000),
            scheduling: SchedulingSettings {
                open_hour: parse_var("CLINIC_OPEN_HOUR", scheduling_defaults.open_hour),
                close_hour: parse_var("CLINIC_CLOSE_HOUR", scheduling_defaults.close_hour),
                slot_minutes: parse_var("SLOT_MINUTES", scheduling_defaults.slot_minutes),
                junior_max_rooms: parse_var("JUNIOR_MAX_ROOMS", scheduling_defaults.junior_max_rooms),
                dedicated_rooms: dedicated_rooms_from_env(),
            },
            targets: TargetSettings {
                daily_revenue: parse_var("DAILY_REVENUE_TARGET", target_defaults.daily_revenue),
                daily_ebita: parse_var("DAILY_EBITA_TARGET", target_defaults.daily_ebita),
                employee_revenue: parse_var("EMPLOYEE_REVENUE_TARGET", target_defaults.employee_revenue),
                no_show_rate: parse_var("NO_SHOW_TARGET", target_defaults.no_show_rate),
                industry_avg_margin: target_defaults.industry_avg_margin,
            },
        };

        if config.scheduling.open_hour >= config.scheduling.close_hour {
            warn!(
                "CLINIC_OPEN_HOUR ({}) is not before CLINIC_CLOSE_HOUR ({}), using 8-18",
                config.scheduling.open_hour, config.scheduling.close_hour
            );
        }

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config.normalized()
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    fn normalized(mut self) -> Self {
        if self.scheduling.open_hour >= self.scheduling.close_hour || self.scheduling.close_hour > 24 {
            self.scheduling.open_hour = 8;
            self.scheduling.close_hour = 18;
        }
        if self.scheduling.slot_minutes == 0 {
            self.scheduling.slot_minutes = 30;
        }
        self
    }
}

fn parse_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn dedicated_rooms_from_env() -> Vec<DedicatedRoom> {
    match env::var("DEDICATED_ROOMS") {
        Ok(raw) => parse_dedicated_rooms(&raw),
        Err(_) => Vec::new(),
    }
}

pub fn parse_dedicated_rooms(raw: &str) -> Vec<DedicatedRoom> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("DEDICATED_ROOMS is not valid JSON ({}), ignoring", e);
        Vec::new()
    })
}
