// --- File: crates/barberbot_booking/src/slots.rs ---
//! Candidate slot generation.
//!
//! Candidates start at opening time and advance by a fixed cadence, independent of the
//! service duration. A candidate is kept when it ends by closing time, misses every break,
//! starts after the minimum notice and falls inside the advance-booking horizon.

use crate::catalog::OpeningHours;
use crate::error::BookingError;
use barberbot_config::BookingSettings;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// Store and calendar calls a commit makes while it owns a hold: live re-read, event
/// creation, history read and write, release.
const CALLS_UNDER_HOLD: u32 = 5;
/// A hold must outlive this many worst-case commits.
const HOLD_TTL_MARGIN: u32 = 2;

/// Booking rules derived from [`BookingSettings`].
#[derive(Debug, Clone)]
pub struct SlotRules {
    pub cadence: Duration,
    pub buffer: Duration,
    pub min_notice: Duration,
    pub horizon_days: i64,
    pub hold_ttl: std::time::Duration,
    pub backend_timeout: std::time::Duration,
    pub default_range_days: u32,
    pub history_ttl: std::time::Duration,
}

impl SlotRules {
    pub fn from_settings(settings: &BookingSettings) -> Result<Self, BookingError> {
        if settings.slot_interval_minutes <= 0 {
            return Err(BookingError::configuration(
                "slot_interval_minutes must be positive",
            ));
        }
        if settings.buffer_minutes < 0 || settings.min_advance_minutes < 0 {
            return Err(BookingError::configuration(
                "buffer_minutes and min_advance_minutes cannot be negative",
            ));
        }
        if settings.advance_booking_days < 0 {
            return Err(BookingError::configuration(
                "advance_booking_days cannot be negative",
            ));
        }
        if settings.hold_ttl_seconds == 0 || settings.backend_timeout_ms == 0 {
            return Err(BookingError::configuration(
                "hold_ttl_seconds and backend_timeout_ms must be positive",
            ));
        }
        let hold_ttl = std::time::Duration::from_secs(settings.hold_ttl_seconds);
        let backend_timeout = std::time::Duration::from_millis(settings.backend_timeout_ms);
        let worst_commit = backend_timeout.saturating_mul(CALLS_UNDER_HOLD);
        if hold_ttl < worst_commit.saturating_mul(HOLD_TTL_MARGIN) {
            return Err(BookingError::configuration(format!(
                "hold_ttl_seconds ({}s) must be at least {}s, twice the worst-case commit time \
                 of {CALLS_UNDER_HOLD} calls at backend_timeout_ms",
                settings.hold_ttl_seconds,
                worst_commit.saturating_mul(HOLD_TTL_MARGIN).as_secs_f64().ceil()
            )));
        }
        if settings.default_range_days == 0 || settings.history_ttl_days == 0 {
            return Err(BookingError::configuration(
                "default_range_days and history_ttl_days must be positive",
            ));
        }
        Ok(Self {
            cadence: Duration::minutes(settings.slot_interval_minutes),
            buffer: Duration::minutes(settings.buffer_minutes),
            min_notice: Duration::minutes(settings.min_advance_minutes),
            horizon_days: settings.advance_booking_days,
            hold_ttl,
            backend_timeout,
            default_range_days: settings.default_range_days,
            history_ttl: std::time::Duration::from_secs(settings.history_ttl_days * 24 * 60 * 60),
        })
    }
}

/// What may be booked as of one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    /// Nothing may start before this (now + minimum notice).
    pub earliest_start: DateTime<Utc>,
    /// The business-local date of "now".
    pub today: NaiveDate,
    /// Last bookable local date (today + horizon).
    pub last_date: NaiveDate,
}

impl BookingWindow {
    pub fn at(now: DateTime<Utc>, tz: Tz, rules: &SlotRules) -> Self {
        let today = now.with_timezone(&tz).date_naive();
        Self {
            earliest_start: now + rules.min_notice,
            today,
            last_date: today + Duration::days(rules.horizon_days),
        }
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.today && date <= self.last_date
    }

    /// Rejects dates outside the window with a user-facing reason.
    pub fn check_date(&self, date: NaiveDate) -> Result<(), BookingError> {
        if date < self.today {
            return Err(BookingError::invalid(format!("{date} is in the past")));
        }
        if date > self.last_date {
            return Err(BookingError::invalid(format!(
                "{date} is beyond the booking horizon (last bookable day {})",
                self.last_date
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Whether `[local_start, local_start + duration)` fits the opening hours of its own date.
pub fn within_hours(local_start: NaiveDateTime, duration: Duration, hours: &OpeningHours) -> bool {
    let date = local_start.date();
    let local_end = local_start + duration;
    if local_start < date.and_time(hours.open) || local_end > date.and_time(hours.close) {
        return false;
    }
    !hours.breaks.iter().any(|b| {
        local_start < date.and_time(b.end) && local_end > date.and_time(b.start)
    })
}

/// Lazy, restartable sequence of candidate slots for one date. Clone it to iterate again.
#[derive(Debug, Clone)]
pub struct Slots<'a> {
    hours: &'a OpeningHours,
    tz: Tz,
    duration: Duration,
    cadence: Duration,
    earliest_start: DateTime<Utc>,
    cursor: Option<NaiveDateTime>,
    close: NaiveDateTime,
}

impl Iterator for Slots<'_> {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        loop {
            let local_start = self.cursor?;
            let local_end = local_start + self.duration;
            if local_end > self.close {
                self.cursor = None;
                return None;
            }
            self.cursor = Some(local_start + self.cadence);

            if !within_hours(local_start, self.duration, self.hours) {
                continue;
            }
            // Local times skipped by a DST jump do not exist.
            let Some(start) = self
                .tz
                .from_local_datetime(&local_start)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
            else {
                continue;
            };
            if start < self.earliest_start {
                continue;
            }
            return Some(Slot {
                start,
                end: start + self.duration,
            });
        }
    }
}

/// Candidate slots for `date` in ascending start order.
///
/// Yields nothing when `date` is outside `window`.
pub fn generate_slots<'a>(
    date: NaiveDate,
    hours: &'a OpeningHours,
    duration: Duration,
    cadence: Duration,
    tz: Tz,
    window: &BookingWindow,
) -> Slots<'a> {
    let in_window = window.contains_date(date) && duration > Duration::zero() && cadence > Duration::zero();
    Slots {
        hours,
        tz,
        duration,
        cadence,
        earliest_start: window.earliest_start,
        cursor: in_window.then(|| date.and_time(hours.open)),
        close: date.and_time(hours.close),
    }
}
