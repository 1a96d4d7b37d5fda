// --- File: crates/barberbot_config/src/models.rs ---

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Business Hours ---
/// Opening hours for one weekday. Times are local "HH:MM" strings in the business timezone.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DayHoursConfig {
    pub open: Option<String>,
    pub close: Option<String>,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub breaks: Vec<BreakConfig>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BreakConfig {
    pub start: String,
    pub end: String,
}

// --- Service Catalog ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    pub id: String,
    /// Localized names keyed by language code ("es", "en", ...).
    pub name: BTreeMap<String, String>,
    #[serde(default)]
    pub description: BTreeMap<String, String>,
    pub duration_minutes: i64,
    /// Price in the smallest currency unit (e.g., cents).
    pub price_cents: i64,
    pub currency: Option<String>,
    pub category: Option<String>,
}

// --- Barber Roster ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BarberConfig {
    pub id: String,
    pub name: String,
    /// Calendar holding this barber's appointments. Falls back to the business calendar.
    pub calendar_id: Option<String>,
    /// Service ids this barber performs. Empty means every service.
    #[serde(default)]
    pub services: Vec<String>,
}

// --- Business Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BusinessConfig {
    pub name: String,
    /// IANA timezone name, e.g. "Europe/Madrid".
    pub timezone: String,
    pub calendar_id: String,
    pub default_language: Option<String>,
    pub currency: Option<String>,
    /// Keyed by lower-case English weekday name ("monday" .. "sunday").
    #[serde(default)]
    pub business_hours: BTreeMap<String, DayHoursConfig>,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    #[serde(default)]
    pub barbers: Vec<BarberConfig>,
}

// --- Booking Rules ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BookingSettings {
    /// Step between candidate start times.
    pub slot_interval_minutes: i64,
    /// Gap kept free around every existing appointment.
    pub buffer_minutes: i64,
    /// Minimum lead time between now and the start of a booking.
    pub min_advance_minutes: i64,
    /// How many days ahead a booking may be placed.
    pub advance_booking_days: i64,
    pub hold_ttl_seconds: u64,
    /// Upper bound for a single calendar or key-value call.
    pub backend_timeout_ms: u64,
    /// Days returned by a multi-day availability query when none are requested.
    pub default_range_days: u32,
    pub history_ttl_days: u64,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            slot_interval_minutes: 15,
            buffer_minutes: 10,
            min_advance_minutes: 120,
            advance_booking_days: 30,
            hold_ttl_seconds: 300,
            backend_timeout_ms: 5000,
            default_range_days: 7,
            history_ttl_days: 365,
        }
    }
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    pub key_path: Option<String>, // Service account JSON key file
}

// --- Redis Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RedisConfig {
    pub url: String, // usually "secret_from_env" -> REDIS_URL
    pub pool_size: Option<u32>,
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_redis: bool,

    pub business: BusinessConfig,
    #[serde(default)]
    pub booking: BookingSettings,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub redis: Option<RedisConfig>,
}
