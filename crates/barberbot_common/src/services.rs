// --- File: crates/barberbot_common/src/services.rs ---
//! Service abstractions for external collaborators.
//!
//! The booking core only talks to the outside world through these traits: a calendar
//! backend holding each barber's appointments and a key-value store with expiry. Concrete
//! adapters live in `barberbot_gcal` and `barberbot_store`; [`memory::InMemoryCalendar`]
//! serves local development and tests.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

pub mod memory;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Errors reported by a calendar backend.
#[derive(Error, Debug, Clone)]
pub enum CalendarError {
    #[error("calendar request failed: {0}")]
    Request(String),
    #[error("calendar returned malformed data: {0}")]
    Malformed(String),
    #[error("calendar rejected the request: {0}")]
    Rejected(String),
}

/// Errors reported by a key-value store.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),
    #[error("store command failed: {0}")]
    Command(String),
    #[error("stored value could not be decoded: {0}")]
    Serialization(String),
}

/// A period during which a calendar is already committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub calendar_ref: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(calendar_ref: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            calendar_ref: calendar_ref.into(),
            start,
            end,
        }
    }

    /// Busy interval for a date-only (all-day) event.
    ///
    /// Date-only events occupy whole local days in the business timezone:
    /// `[first_day 00:00, end_day 00:00)` where `end_day` is exclusive, as calendar
    /// backends report it. An `end_day` not after `first_day` is treated as a single day.
    /// Returns `None` only if local midnight does not exist on either boundary.
    pub fn all_day(
        calendar_ref: impl Into<String>,
        first_day: NaiveDate,
        end_day: NaiveDate,
        tz: Tz,
    ) -> Option<Self> {
        let end_day = if end_day > first_day {
            end_day
        } else {
            first_day + Duration::days(1)
        };
        let start = local_midnight(first_day, tz)?;
        let end = local_midnight(end_day, tz)?;
        Some(Self::new(calendar_ref, start, end))
    }

    pub fn is_degenerate(&self) -> bool {
        self.end <= self.start
    }
}

fn local_midnight(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// An event to be written to a calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// The summary or title of the event.
    pub summary: String,
    pub description: Option<String>,
    /// Private key/value metadata stored alongside the event.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Result of deleting a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Result of a conditional (set-if-absent) write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Acquired,
    AlreadyPresent,
}

/// A trait for calendar backend operations.
///
/// The backend does not provide compare-and-swap writes: `create_event` never checks
/// for conflicts. Mutual exclusion is the caller's job.
pub trait CalendarService: Send + Sync {
    /// Busy periods overlapping `[window_start, window_end)` for one calendar.
    fn list_busy(
        &self,
        calendar_ref: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusyInterval>, CalendarError>;

    /// Create an event and return its external id.
    fn create_event(
        &self,
        calendar_ref: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, String, CalendarError>;

    /// Delete an event by its external id.
    fn delete_event(
        &self,
        calendar_ref: &str,
        event_id: &str,
    ) -> BoxFuture<'_, DeleteOutcome, CalendarError>;
}

/// A trait for key-value stores with per-key expiry.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> BoxFuture<'_, Option<String>, StoreError>;

    fn set(&self, key: &str, value: String, ttl: std::time::Duration) -> BoxFuture<'_, (), StoreError>;

    /// Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> BoxFuture<'_, (), StoreError>;

    /// Atomically delete `key` only while its live value equals `expected`.
    /// Returns whether an entry was removed.
    fn delete_if_value(&self, key: &str, expected: String) -> BoxFuture<'_, bool, StoreError>;

    /// Atomically write `value` only if no live entry exists for `key`.
    fn conditional_set(
        &self,
        key: &str,
        value: String,
        ttl: std::time::Duration,
    ) -> BoxFuture<'_, SetOutcome, StoreError>;
}

/// A factory for the collaborators the booking core needs.
pub trait ServiceFactory: Send + Sync {
    fn calendar_service(&self) -> Arc<dyn CalendarService>;

    fn key_value_store(&self) -> Arc<dyn KeyValueStore>;
}
