//! Test fixtures for booking engine integration tests
//!
//! Builds shop configurations, pinned clocks and engines over in-memory collaborators.

#![allow(dead_code)]

use barberbot_booking::{BookingEngine, BookingRequest, Customer, ResourceSelector};
use barberbot_common::services::memory::InMemoryCalendar;
use barberbot_config::{
    BarberConfig, BookingSettings, BreakConfig, BusinessConfig, DayHoursConfig, ServiceConfig,
};
use barberbot_store::MemoryStore;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Monday 2025-05-05, the day every scenario books on.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
}

/// Friday before, so the whole Monday is past the minimum notice.
pub fn now() -> DateTime<Utc> {
    utc(2025, 5, 2, 12, 0)
}

pub fn hours(open: &str, close: &str, breaks: &[(&str, &str)]) -> DayHoursConfig {
    DayHoursConfig {
        open: Some(open.to_string()),
        close: Some(close.to_string()),
        closed: false,
        breaks: breaks
            .iter()
            .map(|(start, end)| BreakConfig {
                start: start.to_string(),
                end: end.to_string(),
            })
            .collect(),
    }
}

pub fn haircut(minutes: i64) -> ServiceConfig {
    ServiceConfig {
        id: "haircut".to_string(),
        name: BTreeMap::from([("en".to_string(), "Haircut".to_string())]),
        description: BTreeMap::new(),
        duration_minutes: minutes,
        price_cents: 1500,
        currency: Some("EUR".to_string()),
        category: None,
    }
}

pub fn barber(id: &str) -> BarberConfig {
    BarberConfig {
        id: id.to_string(),
        name: format!("Barber {id}"),
        calendar_id: Some(format!("{id}-calendar")),
        services: Vec::new(),
    }
}

/// A UTC shop open on Mondays only.
pub fn shop(monday_hours: DayHoursConfig, barbers: Vec<BarberConfig>) -> BusinessConfig {
    BusinessConfig {
        name: "Scenario Barbers".to_string(),
        timezone: "UTC".to_string(),
        calendar_id: "shop-calendar".to_string(),
        default_language: Some("en".to_string()),
        currency: Some("EUR".to_string()),
        business_hours: BTreeMap::from([("monday".to_string(), monday_hours)]),
        services: vec![haircut(30)],
        barbers,
    }
}

pub fn settings(cadence: i64, buffer: i64) -> BookingSettings {
    BookingSettings {
        slot_interval_minutes: cadence,
        buffer_minutes: buffer,
        min_advance_minutes: 120,
        advance_booking_days: 30,
        hold_ttl_seconds: 300,
        ..Default::default()
    }
}

pub struct Shop {
    pub engine: Arc<BookingEngine>,
    pub calendar: Arc<InMemoryCalendar>,
    pub store: Arc<MemoryStore>,
}

pub fn open_shop(business: BusinessConfig, settings: BookingSettings) -> Shop {
    let calendar = Arc::new(InMemoryCalendar::new());
    let store = Arc::new(MemoryStore::new());
    let engine = BookingEngine::from_config(&business, &settings, calendar.clone(), store.clone())
        .expect("valid scenario config")
        .with_clock(Arc::new(now));
    Shop {
        engine: Arc::new(engine),
        calendar,
        store,
    }
}

pub fn customer(phone: &str, name: &str) -> Customer {
    Customer {
        phone: phone.to_string(),
        name: name.to_string(),
        email: None,
        language: Some("en".to_string()),
    }
}

pub fn booking(barber_id: Option<&str>, start: DateTime<Utc>, customer: Customer) -> BookingRequest {
    BookingRequest {
        service_id: "haircut".to_string(),
        selector: ResourceSelector::from_optional(barber_id),
        start,
        customer,
    }
}
