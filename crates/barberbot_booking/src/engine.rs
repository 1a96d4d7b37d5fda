// --- File: crates/barberbot_booking/src/engine.rs ---
//! Entry point tying the calendar model, aggregator, holds and commit protocol together.

use crate::availability::{AvailabilityAggregator, CandidateSlot, DayAvailability, ResourceSelector};
use crate::catalog::BusinessCalendar;
use crate::commit::{BookingCommitter, BookingRequest, CommitOutcome};
use crate::error::BookingError;
use crate::history::{BookingHistory, BookingRecord};
use crate::hold::HoldLedger;
use crate::slots::SlotRules;
use barberbot_common::services::{CalendarService, KeyValueStore};
use barberbot_config::{BookingSettings, BusinessConfig};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Source of "now". Injected so tests can pin time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct BookingEngine {
    catalog: Arc<BusinessCalendar>,
    rules: Arc<SlotRules>,
    aggregator: AvailabilityAggregator,
    committer: BookingCommitter,
    holds: HoldLedger,
    clock: Clock,
}

impl BookingEngine {
    pub fn from_config(
        business: &BusinessConfig,
        settings: &BookingSettings,
        calendar: Arc<dyn CalendarService>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, BookingError> {
        let catalog = BusinessCalendar::from_config(business)?;
        let rules = SlotRules::from_settings(settings)?;
        Ok(Self::new(catalog, rules, calendar, store))
    }

    pub fn new(
        catalog: BusinessCalendar,
        rules: SlotRules,
        calendar: Arc<dyn CalendarService>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let rules = Arc::new(rules);
        let holds = HoldLedger::new(store.clone(), rules.hold_ttl, rules.backend_timeout);
        let history = BookingHistory::new(store, rules.history_ttl, rules.backend_timeout);
        Self {
            aggregator: AvailabilityAggregator::new(catalog.clone(), rules.clone(), calendar.clone()),
            committer: BookingCommitter::new(
                catalog.clone(),
                rules.clone(),
                calendar,
                holds.clone(),
                history,
            ),
            catalog,
            rules,
            holds,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn catalog(&self) -> &BusinessCalendar {
        &self.catalog
    }

    pub fn rules(&self) -> &SlotRules {
        &self.rules
    }

    pub fn holds(&self) -> &HoldLedger {
        &self.holds
    }

    pub async fn available_slots(
        &self,
        date: NaiveDate,
        service_id: &str,
        selector: &ResourceSelector,
    ) -> Result<Vec<CandidateSlot>, BookingError> {
        self.aggregator
            .available_slots(date, service_id, selector, self.now())
            .await
    }

    /// `days` defaults to the configured range.
    pub async fn available_days(
        &self,
        start: NaiveDate,
        days: Option<u32>,
        service_id: &str,
        selector: &ResourceSelector,
    ) -> Result<Vec<DayAvailability>, BookingError> {
        let days = days.unwrap_or(self.rules.default_range_days);
        self.aggregator
            .available_days(start, days, service_id, selector, self.now())
            .await
    }

    pub async fn book(&self, request: BookingRequest) -> Result<CommitOutcome, BookingError> {
        self.committer.commit(request, self.now()).await
    }

    pub async fn history(&self, phone: &str) -> Result<Vec<BookingRecord>, BookingError> {
        self.committer.history(phone).await
    }

    pub async fn cancel(&self, phone: &str, event_id: &str) -> Result<BookingRecord, BookingError> {
        self.committer.cancel(phone, event_id).await
    }
}
