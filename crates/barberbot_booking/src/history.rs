// --- File: crates/barberbot_booking/src/history.rs ---
//! Per-customer booking log kept in the key-value store under `bookings:<phone>`.
//!
//! Updates are read-modify-write and not atomic; a customer racing themselves can lose an
//! entry. The calendar stays the source of truth for occupancy.

use crate::error::{bounded, Backend, BookingError};
use barberbot_common::services::{KeyValueStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRecord {
    pub resource_ref: String,
    pub calendar_ref: String,
    pub service_ref: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Normalized phone number.
    pub customer: String,
    pub customer_name: String,
    pub external_event_id: String,
    pub status: BookingStatus,
    pub booked_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct BookingHistory {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
    timeout: Duration,
}

pub fn history_key(customer: &str) -> String {
    format!("bookings:{customer}")
}

impl BookingHistory {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration, timeout: Duration) -> Self {
        Self {
            store,
            ttl,
            timeout,
        }
    }

    /// Oldest first.
    pub async fn list(&self, customer: &str) -> Result<Vec<BookingRecord>, BookingError> {
        let raw = bounded(
            Backend::Store,
            self.timeout,
            self.store.get(&history_key(customer)),
        )
        .await?;
        match raw {
            None => Ok(Vec::new()),
            Some(value) => serde_json::from_str(&value)
                .map_err(|e| StoreError::Serialization(e.to_string()).into()),
        }
    }

    pub async fn append(&self, record: &BookingRecord) -> Result<(), BookingError> {
        let mut records = self.list(&record.customer).await?;
        records.push(record.clone());
        self.save(&record.customer, &records).await
    }

    /// Mark the entry for `event_id` cancelled; `None` when the customer has no such entry.
    pub async fn mark_cancelled(
        &self,
        customer: &str,
        event_id: &str,
    ) -> Result<Option<BookingRecord>, BookingError> {
        let mut records = self.list(customer).await?;
        let Some(record) = records
            .iter_mut()
            .find(|r| r.external_event_id == event_id)
        else {
            return Ok(None);
        };
        record.status = BookingStatus::Cancelled;
        let updated = record.clone();
        self.save(customer, &records).await?;
        Ok(Some(updated))
    }

    async fn save(&self, customer: &str, records: &[BookingRecord]) -> Result<(), BookingError> {
        let payload = serde_json::to_string(records)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        bounded(
            Backend::Store,
            self.timeout,
            self.store.set(&history_key(customer), payload, self.ttl),
        )
        .await
    }
}
