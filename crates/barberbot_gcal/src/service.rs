// --- File: crates/barberbot_gcal/src/service.rs ---
//! Google Calendar implementation of [`CalendarService`].
//!
//! Busy periods come from `events.list` rather than the free/busy endpoint so all-day
//! events can be mapped explicitly: a date-only event occupies whole local days in the
//! business timezone. Cancelled and transparent ("free") events are not busy.

use barberbot_common::services::{
    BoxFuture, BusyInterval, CalendarError, CalendarEvent, CalendarService, DeleteOutcome,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use google_calendar3::api::{Event, EventDateTime, EventExtendedProperties};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::HubType;

/// Upper bound on pages read for one window. Exceeding it is an error, never a partial list.
pub const MAX_PAGES: usize = 50;

/// Errors that can occur when interacting with Google Calendar.
#[derive(Error, Debug)]
pub enum GcalServiceError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Unexpected event data: {0}")]
    InvalidEvent(String),
}

impl From<GcalServiceError> for CalendarError {
    fn from(err: GcalServiceError) -> Self {
        match err {
            GcalServiceError::ApiError(e) => CalendarError::Request(e.to_string()),
            GcalServiceError::InvalidEvent(msg) => CalendarError::Malformed(msg),
        }
    }
}

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
    timezone: Tz,
}

impl GoogleCalendarService {
    /// `timezone` is the business timezone, used for all-day events and new events.
    pub fn new(calendar_hub: Arc<HubType>, timezone: Tz) -> Self {
        Self {
            calendar_hub,
            timezone,
        }
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Event>, GcalServiceError> {
        let hub = &self.calendar_hub;
        collect_pages(calendar_id, |page_token| async move {
            let mut request = hub
                .events()
                .list(calendar_id)
                .time_min(window_start)
                .time_max(window_end)
                .single_events(true) // Expand recurring events
                .max_results(250);
            if let Some(token) = page_token.as_deref() {
                request = request.page_token(token);
            }
            let (_, page) = request.doit().await?;
            Ok((page.items.unwrap_or_default(), page.next_page_token))
        })
        .await
    }
}

/// Follow page tokens until the last page.
///
/// `fetch` gets the token of the page to read and returns its items plus the next token.
/// Running out of the [`MAX_PAGES`] budget fails the whole read: a truncated list would
/// hide busy periods.
pub async fn collect_pages<T, F, Fut>(calendar_id: &str, mut fetch: F) -> Result<Vec<T>, GcalServiceError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>), GcalServiceError>>,
{
    let mut items = Vec::new();
    let mut page_token: Option<String> = None;
    for _ in 0..MAX_PAGES {
        let (page, next) = fetch(page_token.take()).await?;
        items.extend(page);
        match next {
            Some(token) => page_token = Some(token),
            None => return Ok(items),
        }
    }
    warn!("Events of '{calendar_id}' still paging after {MAX_PAGES} pages");
    Err(GcalServiceError::InvalidEvent(format!(
        "event list for '{calendar_id}' exceeded {MAX_PAGES} pages"
    )))
}

/// The busy interval an event occupies, if any.
pub fn busy_interval_for(calendar_ref: &str, event: &Event, timezone: Tz) -> Option<BusyInterval> {
    if event.status.as_deref() == Some("cancelled") {
        return None;
    }
    if event.transparency.as_deref() == Some("transparent") {
        return None;
    }
    let start = event.start.as_ref()?;
    let end = event.end.as_ref()?;
    match (start.date_time, end.date_time) {
        (Some(start), Some(end)) => Some(BusyInterval::new(calendar_ref, start, end)),
        _ => {
            let first_day = start.date?;
            let end_day = end.date.unwrap_or(first_day);
            BusyInterval::all_day(calendar_ref, first_day, end_day, timezone)
        }
    }
}

fn event_date_time(at: DateTime<Utc>, timezone: Tz) -> EventDateTime {
    EventDateTime {
        date_time: Some(at),
        time_zone: Some(timezone.name().to_string()),
        ..Default::default()
    }
}

/// The Google event written for a booking.
pub fn to_google_event(event: CalendarEvent, timezone: Tz) -> Event {
    let private: HashMap<String, String> = event.metadata.into_iter().collect();
    Event {
        summary: Some(event.summary),
        description: event.description,
        start: Some(event_date_time(event.start, timezone)),
        end: Some(event_date_time(event.end, timezone)),
        extended_properties: (!private.is_empty()).then(|| EventExtendedProperties {
            private: Some(private),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn is_gone(err: &google_calendar3::Error) -> bool {
    let message = err.to_string();
    message.contains("404") || message.contains("410")
}

impl CalendarService for GoogleCalendarService {
    fn list_busy(
        &self,
        calendar_ref: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusyInterval>, CalendarError> {
        let calendar_ref = calendar_ref.to_string();
        Box::pin(async move {
            let events = self
                .list_events(&calendar_ref, window_start, window_end)
                .await?;
            let mut busy: Vec<BusyInterval> = events
                .iter()
                .filter_map(|event| busy_interval_for(&calendar_ref, event, self.timezone))
                .collect();
            busy.sort_by_key(|b| b.start);
            debug!(
                "Calendar '{}': {} events, {} busy in {} - {}",
                calendar_ref,
                events.len(),
                busy.len(),
                window_start,
                window_end
            );
            Ok(busy)
        })
    }

    /// Inserts the event as given; Google performs no overlap checks.
    fn create_event(
        &self,
        calendar_ref: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, String, CalendarError> {
        let calendar_ref = calendar_ref.to_string();
        Box::pin(async move {
            let new_event = to_google_event(event, self.timezone);
            let (_response, created) = self
                .calendar_hub
                .events()
                .insert(new_event, &calendar_ref)
                .doit()
                .await
                .map_err(GcalServiceError::from)?;
            let id = created.id.ok_or_else(|| {
                GcalServiceError::InvalidEvent("created event has no id".to_string())
            })?;
            info!("Created event {id} in calendar '{calendar_ref}'");
            Ok(id)
        })
    }

    fn delete_event(
        &self,
        calendar_ref: &str,
        event_id: &str,
    ) -> BoxFuture<'_, DeleteOutcome, CalendarError> {
        let calendar_ref = calendar_ref.to_string();
        let event_id = event_id.to_string();
        Box::pin(async move {
            match self
                .calendar_hub
                .events()
                .delete(&calendar_ref, &event_id)
                .doit()
                .await
            {
                Ok(_) => {
                    info!("Deleted event {event_id} from calendar '{calendar_ref}'");
                    Ok(DeleteOutcome::Deleted)
                }
                Err(e) if is_gone(&e) => Ok(DeleteOutcome::NotFound),
                Err(e) => Err(GcalServiceError::ApiError(e).into()),
            }
        })
    }
}
