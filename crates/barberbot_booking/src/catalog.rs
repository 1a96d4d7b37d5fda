// --- File: crates/barberbot_booking/src/catalog.rs ---
//! Business calendar model: opening hours, the service catalog and the barber roster.
//!
//! Built once from configuration and immutable afterwards. Lookups for unknown ids return
//! `None` (or an empty list) so callers can offer the user a choice instead of failing.

use crate::error::BookingError;
use barberbot_config::{BarberConfig, BusinessConfig, DayHoursConfig, ServiceConfig};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use chrono_tz::Tz;
use std::collections::{BTreeMap, HashSet};

/// Id of the implicit resource used when the roster is empty.
pub const HOUSE_RESOURCE_ID: &str = "house";

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Break {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Hours of an open day. `open < close`; breaks lie inside and never overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub breaks: Vec<Break>,
}

impl OpeningHours {
    pub fn new(open: NaiveTime, close: NaiveTime, mut breaks: Vec<Break>) -> Result<Self, BookingError> {
        if open >= close {
            return Err(BookingError::configuration(format!(
                "opening time {open} must be before closing time {close}"
            )));
        }
        breaks.sort_by_key(|b| b.start);
        for b in &breaks {
            if b.start >= b.end {
                return Err(BookingError::configuration(format!(
                    "break {}-{} ends before it starts",
                    b.start, b.end
                )));
            }
            if b.start < open || b.end > close {
                return Err(BookingError::configuration(format!(
                    "break {}-{} lies outside {open}-{close}",
                    b.start, b.end
                )));
            }
        }
        if let Some(pair) = breaks.windows(2).find(|w| w[1].start < w[0].end) {
            return Err(BookingError::configuration(format!(
                "breaks {}-{} and {}-{} overlap",
                pair[0].start, pair[0].end, pair[1].start, pair[1].end
            )));
        }
        Ok(Self { open, close, breaks })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayHours {
    Closed,
    Open(OpeningHours),
}

#[derive(Debug, Clone)]
pub struct Service {
    pub id: String,
    names: BTreeMap<String, String>,
    descriptions: BTreeMap<String, String>,
    pub duration: Duration,
    pub price_cents: i64,
    pub currency: String,
    pub category: Option<String>,
}

impl Service {
    /// Name in `lang`, then in `fallback`, then any name at all.
    pub fn localized_name<'a>(&'a self, lang: Option<&str>, fallback: &str) -> &'a str {
        localized(&self.names, lang, fallback).unwrap_or(&self.id)
    }

    pub fn localized_description<'a>(&'a self, lang: Option<&str>, fallback: &str) -> Option<&'a str> {
        localized(&self.descriptions, lang, fallback)
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration.num_minutes()
    }
}

fn localized<'a>(
    texts: &'a BTreeMap<String, String>,
    lang: Option<&str>,
    fallback: &str,
) -> Option<&'a str> {
    lang.and_then(|l| texts.get(l))
        .or_else(|| texts.get(fallback))
        .or_else(|| texts.values().next())
        .map(String::as_str)
}

/// A bookable resource with its own calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barber {
    pub id: String,
    pub name: String,
    pub calendar_ref: String,
    /// Empty means the barber performs every service.
    services: Vec<String>,
}

impl Barber {
    pub fn performs(&self, service_id: &str) -> bool {
        self.services.is_empty() || self.services.iter().any(|s| s == service_id)
    }
}

#[derive(Debug, Clone)]
pub struct BusinessCalendar {
    name: String,
    timezone: Tz,
    default_language: String,
    week: [DayHours; 7],
    services: Vec<Service>,
    barbers: Vec<Barber>,
}

impl BusinessCalendar {
    pub fn from_config(config: &BusinessConfig) -> Result<Self, BookingError> {
        let timezone: Tz = config.timezone.parse().map_err(|_| {
            BookingError::configuration(format!("unknown timezone '{}'", config.timezone))
        })?;

        for day in config.business_hours.keys() {
            if !WEEKDAYS.iter().any(|(name, _)| name == day) {
                return Err(BookingError::configuration(format!(
                    "unknown weekday '{day}' in business hours"
                )));
            }
        }
        let mut week: [DayHours; 7] = std::array::from_fn(|_| DayHours::Closed);
        for (name, weekday) in WEEKDAYS {
            if let Some(day) = config.business_hours.get(name) {
                week[weekday.num_days_from_monday() as usize] = parse_day(name, day)?;
            }
        }

        let currency = config.currency.clone().unwrap_or_else(|| "EUR".to_string());
        let mut seen = HashSet::new();
        let mut services = Vec::with_capacity(config.services.len());
        for service in &config.services {
            if !seen.insert(service.id.as_str()) {
                return Err(BookingError::configuration(format!(
                    "duplicate service id '{}'",
                    service.id
                )));
            }
            services.push(parse_service(service, &currency)?);
        }

        let mut seen = HashSet::new();
        let mut barbers = Vec::with_capacity(config.barbers.len().max(1));
        for barber in &config.barbers {
            if !seen.insert(barber.id.as_str()) {
                return Err(BookingError::configuration(format!(
                    "duplicate barber id '{}'",
                    barber.id
                )));
            }
            barbers.push(parse_barber(barber, &config.calendar_id, &services)?);
        }
        if barbers.is_empty() {
            barbers.push(Barber {
                id: HOUSE_RESOURCE_ID.to_string(),
                name: config.name.clone(),
                calendar_ref: config.calendar_id.clone(),
                services: Vec::new(),
            });
        }

        Ok(Self {
            name: config.name.clone(),
            timezone,
            default_language: config
                .default_language
                .clone()
                .unwrap_or_else(|| "es".to_string()),
            week,
            services,
            barbers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn hours_for(&self, date: NaiveDate) -> &DayHours {
        &self.week[date.weekday().num_days_from_monday() as usize]
    }

    pub fn services_catalog(&self) -> &[Service] {
        &self.services
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    /// Roster order. With a service id, only barbers performing it; unknown ids yield nothing.
    pub fn resources_for(&self, service_id: Option<&str>) -> Vec<&Barber> {
        match service_id {
            None => self.barbers.iter().collect(),
            Some(id) if self.service(id).is_none() => Vec::new(),
            Some(id) => self.barbers.iter().filter(|b| b.performs(id)).collect(),
        }
    }

    pub fn resource(&self, id: &str) -> Option<&Barber> {
        self.barbers.iter().find(|b| b.id == id)
    }

    pub fn service_name<'a>(&'a self, service: &'a Service, lang: Option<&str>) -> &'a str {
        service.localized_name(lang, &self.default_language)
    }
}

fn parse_time(label: &str, value: &str) -> Result<NaiveTime, BookingError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
        BookingError::configuration(format!("{label}: '{value}' is not a HH:MM time"))
    })
}

fn parse_day(name: &str, day: &DayHoursConfig) -> Result<DayHours, BookingError> {
    if day.closed {
        return Ok(DayHours::Closed);
    }
    let (Some(open), Some(close)) = (day.open.as_deref(), day.close.as_deref()) else {
        return Err(BookingError::configuration(format!(
            "{name}: open and close are required unless the day is closed"
        )));
    };
    let breaks = day
        .breaks
        .iter()
        .map(|b| {
            Ok(Break {
                start: parse_time(name, &b.start)?,
                end: parse_time(name, &b.end)?,
            })
        })
        .collect::<Result<Vec<_>, BookingError>>()?;
    OpeningHours::new(parse_time(name, open)?, parse_time(name, close)?, breaks)
        .map(DayHours::Open)
        .map_err(|e| match e {
            BookingError::Configuration(msg) => BookingError::Configuration(format!("{name}: {msg}")),
            other => other,
        })
}

fn parse_service(service: &ServiceConfig, currency: &str) -> Result<Service, BookingError> {
    if service.duration_minutes <= 0 {
        return Err(BookingError::configuration(format!(
            "service '{}' must last at least one minute",
            service.id
        )));
    }
    if service.price_cents < 0 {
        return Err(BookingError::configuration(format!(
            "service '{}' has a negative price",
            service.id
        )));
    }
    if service.name.is_empty() {
        return Err(BookingError::configuration(format!(
            "service '{}' has no name",
            service.id
        )));
    }
    Ok(Service {
        id: service.id.clone(),
        names: service.name.clone(),
        descriptions: service.description.clone(),
        duration: Duration::minutes(service.duration_minutes),
        price_cents: service.price_cents,
        currency: service
            .currency
            .clone()
            .unwrap_or_else(|| currency.to_string()),
        category: service.category.clone(),
    })
}

fn parse_barber(
    barber: &BarberConfig,
    business_calendar: &str,
    services: &[Service],
) -> Result<Barber, BookingError> {
    if let Some(unknown) = barber
        .services
        .iter()
        .find(|id| !services.iter().any(|s| &s.id == *id))
    {
        return Err(BookingError::configuration(format!(
            "barber '{}' offers unknown service '{unknown}'",
            barber.id
        )));
    }
    Ok(Barber {
        id: barber.id.clone(),
        name: barber.name.clone(),
        calendar_ref: barber
            .calendar_id
            .clone()
            .unwrap_or_else(|| business_calendar.to_string()),
        services: barber.services.clone(),
    })
}
