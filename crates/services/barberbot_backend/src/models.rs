// File: crates/services/barberbot_backend/src/models.rs
//! Request and response bodies of the HTTP API.
//!
//! Times go over the wire as RFC3339 strings in the business timezone.

use barberbot_booking::{BookingRecord, BookingStatus, CandidateSlot, DayAvailability};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct CatalogQuery {
    /// Language for service names, e.g. "es" or "en"
    pub lang: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CatalogResponse {
    pub business: String,
    pub timezone: String,
    pub services: Vec<ServiceEntry>,
    pub barbers: Vec<BarberEntry>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ServiceEntry {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub price_cents: i64,
    pub currency: String,
    pub category: Option<String>,
    /// Ids of the barbers who perform this service.
    pub barbers: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BarberEntry {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    /// First day, YYYY-MM-DD. Defaults to today in the business timezone.
    pub date: Option<String>,
    pub service_id: String,
    /// A barber id; omitted, blank or "any" means any barber.
    pub barber_id: Option<String>,
    /// Number of days to return. Defaults to the configured range.
    pub days: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailabilityResponse {
    pub service_id: String,
    pub timezone: String,
    pub days: Vec<DayEntry>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DayEntry {
    pub date: String,
    pub closed: bool,
    pub slots: Vec<SlotEntry>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotEntry {
    pub start_time: String,
    pub end_time: String,
    /// Local start as "HH:MM", ready for a menu.
    pub label: String,
    pub barbers: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookSlotRequest {
    pub phone: String,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub service_id: String,
    pub barber_id: Option<String>,
    /// RFC3339 start time, any offset.
    pub start_time: String,
    pub language: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingEntry {
    pub event_id: String,
    pub barber_id: String,
    pub service_id: String,
    pub start_time: String,
    pub end_time: String,
    pub customer_name: String,
    /// "confirmed" or "cancelled"
    pub status: String,
    pub booked_at: String,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct HistoryQuery {
    pub phone: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HistoryResponse {
    pub bookings: Vec<BookingEntry>,
}

#[derive(Deserialize, Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CancelBookingRequest {
    pub phone: String,
    pub event_id: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CancellationResponse {
    pub success: bool,
    pub booking: BookingEntry,
}

fn local(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).to_rfc3339()
}

impl SlotEntry {
    pub fn from_candidate(slot: &CandidateSlot, tz: Tz) -> Self {
        Self {
            start_time: local(slot.start, tz),
            end_time: local(slot.end, tz),
            label: slot.start.with_timezone(&tz).format("%H:%M").to_string(),
            barbers: slot.free_resources.clone(),
        }
    }
}

impl DayEntry {
    pub fn from_day(day: &DayAvailability, tz: Tz) -> Self {
        Self {
            date: day.date.format("%Y-%m-%d").to_string(),
            closed: day.closed,
            slots: day
                .slots
                .iter()
                .map(|slot| SlotEntry::from_candidate(slot, tz))
                .collect(),
        }
    }
}

impl BookingEntry {
    pub fn from_record(record: &BookingRecord, tz: Tz) -> Self {
        let status = match record.status {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        };
        Self {
            event_id: record.external_event_id.clone(),
            barber_id: record.resource_ref.clone(),
            service_id: record.service_ref.clone(),
            start_time: local(record.start, tz),
            end_time: local(record.end, tz),
            customer_name: record.customer_name.clone(),
            status: status.to_string(),
            booked_at: local(record.booked_at, tz),
        }
    }
}
