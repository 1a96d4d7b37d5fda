// --- File: crates/barberbot_booking/src/test_support.rs ---
use crate::catalog::BusinessCalendar;
use crate::engine::BookingEngine;
use crate::slots::SlotRules;
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

/// Monday 2025-05-05.
pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
}

/// Sunday 2025-05-04 06:00 UTC, the day before [`monday`].
pub fn sunday_morning() -> DateTime<Utc> {
    utc(2025, 5, 4, 6, 0)
}

pub fn open_day(open: &str, close: &str, breaks: &[(&str, &str)]) -> DayHoursConfig {
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

pub fn service(id: &str, minutes: i64, price_cents: i64) -> ServiceConfig {
    ServiceConfig {
        id: id.to_string(),
        name: BTreeMap::from([
            ("es".to_string(), format!("{id} (es)")),
            ("en".to_string(), format!("{id} (en)")),
        ]),
        description: BTreeMap::new(),
        duration_minutes: minutes,
        price_cents,
        currency: None,
        category: None,
    }
}

pub fn barber(id: &str, services: &[&str]) -> BarberConfig {
    BarberConfig {
        id: id.to_string(),
        name: id.to_uppercase(),
        calendar_id: Some(format!("{id}@calendar")),
        services: services.iter().map(|s| s.to_string()).collect(),
    }
}

/// UTC shop: weekdays 09:00-18:00 with lunch 14:00-15:00, Saturday 10:00-14:00, Sunday closed.
pub fn business_config() -> BusinessConfig {
    let weekday = open_day("09:00", "18:00", &[("14:00", "15:00")]);
    let mut hours = BTreeMap::new();
    for day in ["monday", "tuesday", "wednesday", "thursday", "friday"] {
        hours.insert(day.to_string(), weekday.clone());
    }
    hours.insert("saturday".to_string(), open_day("10:00", "14:00", &[]));
    hours.insert(
        "sunday".to_string(),
        DayHoursConfig {
            closed: true,
            ..Default::default()
        },
    );
    BusinessConfig {
        name: "Test Barbers".to_string(),
        timezone: "UTC".to_string(),
        calendar_id: "shop@calendar".to_string(),
        default_language: Some("es".to_string()),
        currency: Some("EUR".to_string()),
        business_hours: hours,
        services: vec![service("corte", 30, 1500), service("barba", 20, 1000)],
        barbers: vec![barber("ana", &[]), barber("luis", &["corte"])],
    }
}

pub fn settings() -> BookingSettings {
    BookingSettings {
        slot_interval_minutes: 15,
        buffer_minutes: 10,
        min_advance_minutes: 120,
        advance_booking_days: 30,
        ..Default::default()
    }
}

pub fn catalog() -> BusinessCalendar {
    BusinessCalendar::from_config(&business_config()).unwrap()
}

pub fn rules() -> SlotRules {
    SlotRules::from_settings(&settings()).unwrap()
}

pub struct Harness {
    pub engine: BookingEngine,
    pub calendar: Arc<InMemoryCalendar>,
    pub store: Arc<MemoryStore>,
}

pub fn harness_with(business: BusinessConfig, settings: BookingSettings, now: DateTime<Utc>) -> Harness {
    let calendar = Arc::new(InMemoryCalendar::new());
    let store = Arc::new(MemoryStore::new());
    let engine = BookingEngine::from_config(&business, &settings, calendar.clone(), store.clone())
        .unwrap()
        .with_clock(Arc::new(move || now));
    Harness {
        engine,
        calendar,
        store,
    }
}

pub fn harness() -> Harness {
    harness_with(business_config(), settings(), sunday_morning())
}
