// --- File: crates/barberbot_booking/src/commit.rs ---
//! Booking commit protocol.
//!
//! Every write goes hold → verify → create → release, strictly in that order:
//!
//! * `Requested -> HoldAcquired -> Verified -> Committed`
//! * `Requested -> HoldAcquired -> Conflicted -> HoldReleased`
//! * `Requested -> HoldDenied`
//!
//! The hold is the only thing preventing double booking; the calendar accepts overlapping
//! events. The hold is released on every exit path, including errors and cancellation of
//! the commit future.

use crate::availability::{fetch_busy_sets, lookup_service, resolve_resources, ResourceSelector};
use crate::catalog::{Barber, BusinessCalendar, DayHours, Service};
use crate::customer::{normalize_phone, Customer};
use crate::error::{bounded, Backend, BookingError};
use crate::history::{BookingHistory, BookingRecord, BookingStatus};
use crate::hold::{HoldGuard, HoldLedger, HoldOutcome, SlotKey};
use crate::slots::{within_hours, BookingWindow, Slot, SlotRules};
use barberbot_common::services::{CalendarEvent, CalendarService, DeleteOutcome};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub service_id: String,
    pub selector: ResourceSelector,
    pub start: DateTime<Utc>,
    pub customer: Customer,
}

/// Where a commit found the slot taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictStage {
    /// "Any barber" request and no barber was free on the live read.
    NoFreeResource,
    /// Another holder owns the hold.
    HoldDenied,
    /// The live calendar read after taking the hold showed a conflict.
    CalendarConflict,
    /// The same customer is already booking this slot in another request.
    InProgress,
}

impl fmt::Display for ConflictStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictStage::NoFreeResource => write!(f, "no barber is free at that time"),
            ConflictStage::HoldDenied => write!(f, "someone else is booking that time"),
            ConflictStage::CalendarConflict => write!(f, "that time was just booked"),
            ConflictStage::InProgress => write!(f, "your booking for that time is already being processed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(BookingRecord),
    SlotNoLongerAvailable(ConflictStage),
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed(_))
    }

    pub fn into_result(self) -> Result<BookingRecord, BookingError> {
        match self {
            CommitOutcome::Committed(record) => Ok(record),
            CommitOutcome::SlotNoLongerAvailable(stage) => Err(BookingError::SlotNoLongerAvailable(
                format!("{stage}, please choose another time"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum CommitState {
    Requested,
    HoldAcquired,
    HoldDenied,
    Verified,
    Conflicted,
    Committed,
    HoldReleased,
}

impl fmt::Display for CommitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommitState::Requested => "requested",
            CommitState::HoldAcquired => "hold_acquired",
            CommitState::HoldDenied => "hold_denied",
            CommitState::Verified => "verified",
            CommitState::Conflicted => "conflicted",
            CommitState::Committed => "committed",
            CommitState::HoldReleased => "hold_released",
        };
        f.write_str(name)
    }
}

pub struct BookingCommitter {
    catalog: Arc<BusinessCalendar>,
    rules: Arc<SlotRules>,
    calendar: Arc<dyn CalendarService>,
    holds: HoldLedger,
    history: BookingHistory,
}

impl BookingCommitter {
    pub fn new(
        catalog: Arc<BusinessCalendar>,
        rules: Arc<SlotRules>,
        calendar: Arc<dyn CalendarService>,
        holds: HoldLedger,
        history: BookingHistory,
    ) -> Self {
        Self {
            catalog,
            rules,
            calendar,
            holds,
            history,
        }
    }

    /// Book `request`. A taken slot is a normal outcome, not an error.
    pub async fn commit(
        &self,
        request: BookingRequest,
        now: DateTime<Utc>,
    ) -> Result<CommitOutcome, BookingError> {
        let customer = request.customer.validated()?;
        let service = lookup_service(&self.catalog, &request.service_id)?;
        let resources = resolve_resources(&self.catalog, service, &request.selector)?;
        let slot = self.check_bookable(request.start, service, now)?;
        info!(
            state = %CommitState::Requested,
            service = %service.id,
            start = %slot.start,
            holder = %customer.phone,
            "booking requested"
        );

        let candidates: Vec<&Barber> = match request.selector {
            ResourceSelector::Specific(_) => resources,
            ResourceSelector::Any => {
                let busy = fetch_busy_sets(
                    self.calendar.as_ref(),
                    &resources,
                    slot.start - self.rules.buffer,
                    slot.end + self.rules.buffer,
                    &self.rules,
                )
                .await?;
                resources
                    .into_iter()
                    .zip(busy)
                    .filter(|(_, set)| set.is_free(slot.start, slot.end))
                    .map(|(barber, _)| barber)
                    .collect()
            }
        };
        if candidates.is_empty() {
            info!(state = %CommitState::Conflicted, start = %slot.start, "no barber free");
            return Ok(CommitOutcome::SlotNoLongerAvailable(
                ConflictStage::NoFreeResource,
            ));
        }

        // Roster order; with "any barber" a held barber yields to the next free one.
        for barber in candidates {
            let key = SlotKey::new(&barber.id, slot.start);
            match self.holds.acquire(&key, &customer.phone, now).await? {
                HoldOutcome::Acquired(hold) => {
                    info!(
                        state = %CommitState::HoldAcquired,
                        slot_key = %key,
                        holder = %customer.phone,
                        "hold acquired"
                    );
                    let guard = HoldGuard::new(self.holds.clone(), key, hold);
                    let result = self.verify_and_write(barber, service, slot, &customer, now).await;
                    let key = guard.key().clone();
                    match guard.release().await {
                        Ok(true) => info!(state = %CommitState::HoldReleased, slot_key = %key, "hold released"),
                        Ok(false) => warn!(slot_key = %key, "hold expired before release"),
                        Err(e) => warn!(slot_key = %key, "hold release failed, left to expire: {e}"),
                    }
                    return result;
                }
                // Another attempt by the same customer owns this hold; it alone may write.
                HoldOutcome::AlreadyHeld(_) => {
                    info!(
                        state = %CommitState::HoldDenied,
                        slot_key = %key,
                        holder = %customer.phone,
                        "booking already in progress for holder"
                    );
                    return Ok(CommitOutcome::SlotNoLongerAvailable(
                        ConflictStage::InProgress,
                    ));
                }
                HoldOutcome::Conflict { holder } => {
                    info!(
                        state = %CommitState::HoldDenied,
                        slot_key = %key,
                        holder = %customer.phone,
                        owner = %holder,
                        "hold denied"
                    );
                }
            }
        }
        Ok(CommitOutcome::SlotNoLongerAvailable(ConflictStage::HoldDenied))
    }

    /// Cancel one of the customer's own bookings.
    pub async fn cancel(&self, phone: &str, event_id: &str) -> Result<BookingRecord, BookingError> {
        let customer = normalize_phone(phone)?;
        let record = self
            .history
            .list(&customer)
            .await?
            .into_iter()
            .find(|r| r.external_event_id == event_id)
            .ok_or_else(|| BookingError::NotFound(format!("no booking '{event_id}' for this customer")))?;
        if record.status == BookingStatus::Cancelled {
            return Ok(record);
        }

        let deleted = bounded(
            Backend::Calendar,
            self.rules.backend_timeout,
            self.calendar.delete_event(&record.calendar_ref, event_id),
        )
        .await?;
        if deleted == DeleteOutcome::NotFound {
            warn!("Event {event_id} was already gone from calendar '{}'", record.calendar_ref);
        }

        let cancelled = self
            .history
            .mark_cancelled(&customer, event_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("no booking '{event_id}' for this customer")))?;
        info!("Cancelled booking {event_id} for {customer}");
        Ok(cancelled)
    }

    pub async fn history(&self, phone: &str) -> Result<Vec<BookingRecord>, BookingError> {
        let customer = normalize_phone(phone)?;
        self.history.list(&customer).await
    }

    /// Reject starts outside the booking window or the opening hours of their local date.
    fn check_bookable(&self, start: DateTime<Utc>, service: &Service, now: DateTime<Utc>) -> Result<Slot, BookingError> {
        let tz = self.catalog.timezone();
        let window = BookingWindow::at(now, tz, &self.rules);
        let local = start.with_timezone(&tz).naive_local();
        window.check_date(local.date())?;
        if start < window.earliest_start {
            return Err(BookingError::invalid(format!(
                "bookings must start at least {} minutes from now",
                self.rules.min_notice.num_minutes()
            )));
        }
        match self.catalog.hours_for(local.date()) {
            DayHours::Closed => {
                return Err(BookingError::invalid(format!(
                    "the shop is closed on {}",
                    local.date()
                )))
            }
            DayHours::Open(hours) => {
                if !within_hours(local, service.duration, hours) {
                    return Err(BookingError::invalid(format!(
                        "{} - {} is outside business hours",
                        local.time(),
                        (local + service.duration).time()
                    )));
                }
            }
        }
        Ok(Slot {
            start,
            end: start + service.duration,
        })
    }

    async fn verify_and_write(
        &self,
        barber: &Barber,
        service: &Service,
        slot: Slot,
        customer: &Customer,
        now: DateTime<Utc>,
    ) -> Result<CommitOutcome, BookingError> {
        let busy = fetch_busy_sets(
            self.calendar.as_ref(),
            &[barber],
            slot.start - self.rules.buffer,
            slot.end + self.rules.buffer,
            &self.rules,
        )
        .await?;
        if !busy.iter().all(|set| set.is_free(slot.start, slot.end)) {
            info!(
                state = %CommitState::Conflicted,
                barber = %barber.id,
                start = %slot.start,
                "slot taken on live calendar"
            );
            return Ok(CommitOutcome::SlotNoLongerAvailable(
                ConflictStage::CalendarConflict,
            ));
        }
        info!(state = %CommitState::Verified, barber = %barber.id, start = %slot.start, "slot verified");

        let event = self.build_event(barber, service, slot, customer);
        let event_id = bounded(
            Backend::Calendar,
            self.rules.backend_timeout,
            self.calendar.create_event(&barber.calendar_ref, event),
        )
        .await?;

        let record = BookingRecord {
            resource_ref: barber.id.clone(),
            calendar_ref: barber.calendar_ref.clone(),
            service_ref: service.id.clone(),
            start: slot.start,
            end: slot.end,
            customer: customer.phone.clone(),
            customer_name: customer.name.clone(),
            external_event_id: event_id,
            status: BookingStatus::Confirmed,
            booked_at: now,
        };
        // The calendar event is the booking; a lost history entry only hides it from the customer.
        if let Err(e) = self.history.append(&record).await {
            warn!(
                "Booking {} committed but history update failed: {e}",
                record.external_event_id
            );
        }
        info!(
            state = %CommitState::Committed,
            barber = %barber.id,
            start = %slot.start,
            event_id = %record.external_event_id,
            "booking committed"
        );
        Ok(CommitOutcome::Committed(record))
    }

    fn build_event(&self, barber: &Barber, service: &Service, slot: Slot, customer: &Customer) -> CalendarEvent {
        let service_name = self
            .catalog
            .service_name(service, customer.language.as_deref());
        let mut description = format!(
            "Customer: {}\nPhone: {}\n",
            customer.name, customer.phone
        );
        if let Some(email) = &customer.email {
            description.push_str(&format!("Email: {email}\n"));
        }
        description.push_str(&format!(
            "Service: {service_name}\nDuration: {} min\nPrice: {}\nBarber: {}",
            service.duration_minutes(),
            format_price(service.price_cents, &service.currency),
            barber.name
        ));

        let metadata = BTreeMap::from([
            ("customer_phone".to_string(), customer.phone.clone()),
            ("service_id".to_string(), service.id.clone()),
            ("barber_id".to_string(), barber.id.clone()),
        ]);
        CalendarEvent {
            start: slot.start,
            end: slot.end,
            summary: format!("{service_name} - {}", customer.name),
            description: Some(description),
            metadata,
        }
    }
}

fn format_price(cents: i64, currency: &str) -> String {
    format!("{}.{:02} {currency}", cents / 100, cents % 100)
}
