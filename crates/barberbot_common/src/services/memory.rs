//! In-process calendar backend.
//!
//! Used when no Google Calendar is configured and by tests. Like the real backend it does
//! not reject overlapping events; it also counts calls and can simulate outages and latency.

use super::{BoxFuture, BusyInterval, CalendarError, CalendarEvent, CalendarService, DeleteOutcome};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// An event as held by [`InMemoryCalendar`].
#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub id: String,
    pub event: CalendarEvent,
}

#[derive(Default)]
pub struct InMemoryCalendar {
    events: Mutex<HashMap<String, Vec<StoredEvent>>>,
    list_busy_calls: AtomicUsize,
    create_calls: AtomicUsize,
    unavailable: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl InMemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a busy period; returns the generated event id.
    pub fn add_busy(&self, calendar_ref: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        self.insert(
            calendar_ref,
            CalendarEvent {
                start,
                end,
                summary: "busy".to_string(),
                description: None,
                metadata: Default::default(),
            },
        )
    }

    pub fn events(&self, calendar_ref: &str) -> Vec<StoredEvent> {
        self.lock_events()
            .get(calendar_ref)
            .cloned()
            .unwrap_or_default()
    }

    pub fn list_busy_calls(&self) -> usize {
        self.list_busy_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Make every following call fail with [`CalendarError::Request`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Delay every following call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap_or_else(|p| p.into_inner()) = latency;
    }

    fn lock_events(&self) -> MutexGuard<'_, HashMap<String, Vec<StoredEvent>>> {
        self.events.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn insert(&self, calendar_ref: &str, event: CalendarEvent) -> String {
        let id = format!("mem-{}", uuid::Uuid::new_v4().simple());
        self.lock_events()
            .entry(calendar_ref.to_string())
            .or_default()
            .push(StoredEvent {
                id: id.clone(),
                event,
            });
        id
    }

    fn busy_in_window(
        &self,
        calendar_ref: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Vec<BusyInterval> {
        let events = self.lock_events();
        let mut busy: Vec<BusyInterval> = events
            .get(calendar_ref)
            .map(|stored| {
                stored
                    .iter()
                    .filter(|s| s.event.start < window_end && s.event.end > window_start)
                    .map(|s| BusyInterval::new(calendar_ref, s.event.start, s.event.end))
                    .collect()
            })
            .unwrap_or_default();
        busy.sort_by_key(|b| b.start);
        busy
    }

    fn remove(&self, calendar_ref: &str, event_id: &str) -> DeleteOutcome {
        let mut events = self.lock_events();
        let Some(stored) = events.get_mut(calendar_ref) else {
            return DeleteOutcome::NotFound;
        };
        let before = stored.len();
        stored.retain(|s| s.id != event_id);
        if stored.len() < before {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::NotFound
        }
    }

    async fn before_call(&self) -> Result<(), CalendarError> {
        let latency = *self.latency.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CalendarError::Request("calendar backend offline".to_string()));
        }
        Ok(())
    }
}

impl CalendarService for InMemoryCalendar {
    fn list_busy(
        &self,
        calendar_ref: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<BusyInterval>, CalendarError> {
        let calendar_ref = calendar_ref.to_string();
        Box::pin(async move {
            self.list_busy_calls.fetch_add(1, Ordering::SeqCst);
            self.before_call().await?;
            Ok(self.busy_in_window(&calendar_ref, window_start, window_end))
        })
    }

    fn create_event(
        &self,
        calendar_ref: &str,
        event: CalendarEvent,
    ) -> BoxFuture<'_, String, CalendarError> {
        let calendar_ref = calendar_ref.to_string();
        Box::pin(async move {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            self.before_call().await?;
            if event.end <= event.start {
                return Err(CalendarError::Rejected(
                    "End time must be after start time".to_string(),
                ));
            }
            Ok(self.insert(&calendar_ref, event))
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
            self.before_call().await?;
            Ok(self.remove(&calendar_ref, &event_id))
        })
    }
}
