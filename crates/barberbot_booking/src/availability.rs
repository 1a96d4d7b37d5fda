// --- File: crates/barberbot_booking/src/availability.rs ---
//! Availability aggregation over one barber or the whole roster.
//!
//! Busy periods are read once per resource for the whole query window, never per slot,
//! and never cached across requests. Closed days return nothing without touching the
//! calendar. The aggregator has no side effects.

use crate::catalog::{Barber, BusinessCalendar, DayHours, Service};
use crate::conflict::BusySet;
use crate::error::{bounded, Backend, BookingError};
use crate::slots::{generate_slots, BookingWindow, Slot, SlotRules};
use barberbot_common::services::CalendarService;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Which barbers a query or booking may use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSelector {
    Specific(String),
    Any,
}

impl ResourceSelector {
    /// `None`, blank and `"any"` all mean any barber.
    pub fn from_optional(id: Option<&str>) -> Self {
        match id.map(str::trim) {
            None | Some("") => ResourceSelector::Any,
            Some(id) if id.eq_ignore_ascii_case("any") => ResourceSelector::Any,
            Some(id) => ResourceSelector::Specific(id.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Free barber ids in roster order. Never empty for an offered slot.
    pub free_resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub closed: bool,
    pub slots: Vec<CandidateSlot>,
}

pub struct AvailabilityAggregator {
    catalog: Arc<BusinessCalendar>,
    rules: Arc<SlotRules>,
    calendar: Arc<dyn CalendarService>,
}

impl AvailabilityAggregator {
    pub fn new(
        catalog: Arc<BusinessCalendar>,
        rules: Arc<SlotRules>,
        calendar: Arc<dyn CalendarService>,
    ) -> Self {
        Self {
            catalog,
            rules,
            calendar,
        }
    }

    /// Bookable slots on one date, ascending by start.
    pub async fn available_slots(
        &self,
        date: NaiveDate,
        service_id: &str,
        selector: &ResourceSelector,
        now: DateTime<Utc>,
    ) -> Result<Vec<CandidateSlot>, BookingError> {
        let service = lookup_service(&self.catalog, service_id)?;
        let resources = resolve_resources(&self.catalog, service, selector)?;
        let window = BookingWindow::at(now, self.catalog.timezone(), &self.rules);
        window.check_date(date)?;

        let slots = self.day_slots(date, service, &window).unwrap_or_default();
        if slots.is_empty() {
            debug!("No candidate slots on {date} for '{service_id}'");
            return Ok(Vec::new());
        }
        let busy = self.busy_sets(&resources, &slots).await?;
        Ok(annotate(&slots, &resources, &busy))
    }

    /// Availability for `days` consecutive dates from `start`, clipped to the booking window.
    ///
    /// Closed days are listed with `closed = true`. All busy periods are read in one batch
    /// per resource covering every open day.
    pub async fn available_days(
        &self,
        start: NaiveDate,
        days: u32,
        service_id: &str,
        selector: &ResourceSelector,
        now: DateTime<Utc>,
    ) -> Result<Vec<DayAvailability>, BookingError> {
        let service = lookup_service(&self.catalog, service_id)?;
        let resources = resolve_resources(&self.catalog, service, selector)?;
        let window = BookingWindow::at(now, self.catalog.timezone(), &self.rules);

        // Range end is exclusive; `days = 0` yields nothing.
        let end = start
            .checked_add_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        let first = start.max(window.today);
        let mut per_day: Vec<(NaiveDate, Option<Vec<Slot>>)> = Vec::new();
        for date in first.iter_days().take_while(|d| *d < end && *d <= window.last_date) {
            per_day.push((date, self.day_slots(date, service, &window)));
        }

        let all_slots: Vec<Slot> = per_day
            .iter()
            .filter_map(|(_, slots)| slots.as_ref())
            .flatten()
            .copied()
            .collect();
        let busy = if all_slots.is_empty() {
            Vec::new()
        } else {
            self.busy_sets(&resources, &all_slots).await?
        };

        Ok(per_day
            .into_iter()
            .map(|(date, slots)| match slots {
                None => DayAvailability {
                    date,
                    closed: true,
                    slots: Vec::new(),
                },
                Some(slots) => DayAvailability {
                    date,
                    closed: false,
                    slots: annotate(&slots, &resources, &busy),
                },
            })
            .collect())
    }

    /// `None` for a closed day.
    fn day_slots(&self, date: NaiveDate, service: &Service, window: &BookingWindow) -> Option<Vec<Slot>> {
        match self.catalog.hours_for(date) {
            DayHours::Closed => None,
            DayHours::Open(hours) => Some(
                generate_slots(
                    date,
                    hours,
                    service.duration,
                    self.rules.cadence,
                    self.catalog.timezone(),
                    window,
                )
                .collect(),
            ),
        }
    }

    /// One calendar read per resource, spanning every slot plus the buffer.
    async fn busy_sets(&self, resources: &[&Barber], slots: &[Slot]) -> Result<Vec<BusySet>, BookingError> {
        let (Some(first), Some(last)) = (slots.iter().map(|s| s.start).min(), slots.iter().map(|s| s.end).max())
        else {
            return Ok(vec![BusySet::default(); resources.len()]);
        };
        fetch_busy_sets(
            self.calendar.as_ref(),
            resources,
            first - self.rules.buffer,
            last + self.rules.buffer,
            &self.rules,
        )
        .await
    }
}

pub(crate) fn lookup_service<'a>(catalog: &'a BusinessCalendar, service_id: &str) -> Result<&'a Service, BookingError> {
    catalog
        .service(service_id)
        .ok_or_else(|| BookingError::invalid(format!("unknown service '{service_id}'")))
}

/// Candidate barbers for `service` in roster order.
pub(crate) fn resolve_resources<'a>(
    catalog: &'a BusinessCalendar,
    service: &Service,
    selector: &ResourceSelector,
) -> Result<Vec<&'a Barber>, BookingError> {
    match selector {
        ResourceSelector::Specific(id) => {
            let barber = catalog
                .resource(id)
                .ok_or_else(|| BookingError::invalid(format!("unknown barber '{id}'")))?;
            if !barber.performs(&service.id) {
                return Err(BookingError::invalid(format!(
                    "barber '{id}' does not offer '{}'",
                    service.id
                )));
            }
            Ok(vec![barber])
        }
        ResourceSelector::Any => {
            let barbers = catalog.resources_for(Some(&service.id));
            if barbers.is_empty() {
                return Err(BookingError::invalid(format!(
                    "no barber offers '{}'",
                    service.id
                )));
            }
            Ok(barbers)
        }
    }
}

/// Busy sets for each resource over `[window_start, window_end)`, fetched concurrently.
pub(crate) async fn fetch_busy_sets(
    calendar: &dyn CalendarService,
    resources: &[&Barber],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    rules: &SlotRules,
) -> Result<Vec<BusySet>, BookingError> {
    let reads = resources.iter().map(|barber| async move {
        let busy = bounded(
            Backend::Calendar,
            rules.backend_timeout,
            calendar.list_busy(&barber.calendar_ref, window_start, window_end),
        )
        .await?;
        debug!(
            "Barber '{}' has {} busy intervals in {} - {}",
            barber.id,
            busy.len(),
            window_start,
            window_end
        );
        Ok::<_, BookingError>(BusySet::new(&busy, rules.buffer))
    });
    try_join_all(reads).await
}

fn annotate(slots: &[Slot], resources: &[&Barber], busy: &[BusySet]) -> Vec<CandidateSlot> {
    slots
        .iter()
        .filter_map(|slot| {
            let free_resources: Vec<String> = resources
                .iter()
                .zip(busy)
                .filter(|(_, set)| set.is_free(slot.start, slot.end))
                .map(|(barber, _)| barber.id.clone())
                .collect();
            (!free_resources.is_empty()).then(|| CandidateSlot {
                start: slot.start,
                end: slot.end,
                free_resources,
            })
        })
        .collect()
}
