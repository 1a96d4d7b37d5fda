// --- File: crates/barberbot_booking/src/hold.rs ---
//! Short-lived exclusive claims on a slot.
//!
//! Holds live in the key-value store and are taken with its atomic set-if-absent, so every
//! process sharing the store sees the same holds. A hold disappears when released or when
//! its TTL runs out, whichever comes first. Each acquisition carries its own token, and a
//! release only removes the exact hold it took.

use crate::error::{bounded, Backend, BookingError};
use barberbot_common::services::{KeyValueStore, SetOutcome, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Store key of a hold: resource id plus the exact start instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey(String);

impl SlotKey {
    pub fn new(resource_id: &str, start: DateTime<Utc>) -> Self {
        SlotKey(format!(
            "hold:{resource_id}:{}",
            start.to_rfc3339_opts(SecondsFormat::AutoSi, true)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingHold {
    pub slot_key: String,
    pub holder: String,
    /// Identifies the acquisition that wrote this hold.
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldOutcome {
    /// Newly taken by this call; the caller owns it and must release it.
    Acquired(BookingHold),
    /// The same holder already owns the hold through another attempt still in flight.
    AlreadyHeld(BookingHold),
    Conflict { holder: String },
}

#[derive(Clone)]
pub struct HoldLedger {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
    timeout: Duration,
}

impl HoldLedger {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration, timeout: Duration) -> Self {
        Self {
            store,
            ttl,
            timeout,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Take the hold for `key`, or report who owns it.
    ///
    /// Re-acquiring by the current holder reports [`HoldOutcome::AlreadyHeld`] without
    /// creating a second hold or extending the first.
    pub async fn acquire(
        &self,
        key: &SlotKey,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<HoldOutcome, BookingError> {
        let hold = BookingHold {
            slot_key: key.to_string(),
            holder: holder.to_string(),
            token: Uuid::new_v4().simple().to_string(),
            created_at: now,
            expires_at: now + chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::zero()),
        };
        let payload = serde_json::to_string(&hold)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        // The live hold may expire between the failed set and the read; try once more then.
        for _ in 0..2 {
            let outcome = bounded(
                Backend::Store,
                self.timeout,
                self.store.conditional_set(key.as_str(), payload.clone(), self.ttl),
            )
            .await?;
            if outcome == SetOutcome::Acquired {
                debug!(slot_key = %key, holder, "hold taken");
                return Ok(HoldOutcome::Acquired(hold));
            }
            match self.current(key).await? {
                Some(existing) if existing.holder == holder => {
                    debug!(slot_key = %key, holder, "hold already owned by holder");
                    return Ok(HoldOutcome::AlreadyHeld(existing));
                }
                Some(existing) => {
                    return Ok(HoldOutcome::Conflict {
                        holder: existing.holder,
                    })
                }
                None => continue,
            }
        }
        Ok(HoldOutcome::Conflict {
            holder: "unknown".to_string(),
        })
    }

    /// Drop `hold` if it is still the live hold for its slot.
    ///
    /// Returns `false` when it already expired or another acquisition replaced it; that
    /// newer hold is left alone. Releasing twice is not an error.
    pub async fn release(&self, hold: &BookingHold) -> Result<bool, BookingError> {
        let payload = serde_json::to_string(hold)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        bounded(
            Backend::Store,
            self.timeout,
            self.store.delete_if_value(&hold.slot_key, payload),
        )
        .await
    }

    pub async fn current(&self, key: &SlotKey) -> Result<Option<BookingHold>, BookingError> {
        let raw = bounded(Backend::Store, self.timeout, self.store.get(key.as_str())).await?;
        raw.map(|value| {
            serde_json::from_str(&value)
                .map_err(|e| BookingError::from(StoreError::Serialization(e.to_string())))
        })
        .transpose()
    }
}

/// Releases its hold when dropped, unless [`HoldGuard::release`] already did.
///
/// The release on drop is spawned onto the current runtime; outside a runtime the hold is
/// left to its TTL.
pub struct HoldGuard {
    ledger: HoldLedger,
    key: SlotKey,
    hold: BookingHold,
    armed: bool,
}

impl HoldGuard {
    pub fn new(ledger: HoldLedger, key: SlotKey, hold: BookingHold) -> Self {
        Self {
            ledger,
            key,
            hold,
            armed: true,
        }
    }

    pub fn key(&self) -> &SlotKey {
        &self.key
    }

    /// `Ok(false)` when the hold had already expired or changed hands.
    pub async fn release(mut self) -> Result<bool, BookingError> {
        self.armed = false;
        self.ledger.release(&self.hold).await
    }
}

impl Drop for HoldGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let ledger = self.ledger.clone();
        let key = self.key.clone();
        let hold = self.hold.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = ledger.release(&hold).await {
                        warn!(slot_key = %key, "failed to release abandoned hold: {e}");
                    }
                });
            }
            Err(_) => warn!(slot_key = %key, "no runtime to release hold; it will expire"),
        }
    }
}
