// --- File: crates/barberbot_store/src/memory.rs ---
//! In-process [`KeyValueStore`] backed by a concurrent map.
//!
//! Expiry is lazy: a read that finds a stale entry removes it. [`MemoryStore::purge_expired`]
//! reclaims entries nobody reads again and is driven by the sweeper task.

use barberbot_common::services::{BoxFuture, KeyValueStore, SetOutcome, StoreError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Instant,
}

impl StoredValue {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, StoredValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, stored| stored.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of entries held, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_live(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        if let Some(stored) = self.entries.get(key) {
            if stored.is_live(now) {
                return Some(stored.value.clone());
            }
        }
        self.entries.remove_if(key, |_, stored| !stored.is_live(now));
        None
    }

    fn set_if_absent(&self, key: &str, value: String, ttl: Duration) -> SetOutcome {
        let now = Instant::now();
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    SetOutcome::AlreadyPresent
                } else {
                    occupied.insert(StoredValue::new(value, ttl));
                    SetOutcome::Acquired
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StoredValue::new(value, ttl));
                SetOutcome::Acquired
            }
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Option<String>, StoreError> {
        let value = self.get_live(key);
        Box::pin(std::future::ready(Ok(value)))
    }

    fn set(&self, key: &str, value: String, ttl: Duration) -> BoxFuture<'_, (), StoreError> {
        self.entries
            .insert(key.to_string(), StoredValue::new(value, ttl));
        Box::pin(std::future::ready(Ok(())))
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, (), StoreError> {
        self.entries.remove(key);
        Box::pin(std::future::ready(Ok(())))
    }

    fn delete_if_value(&self, key: &str, expected: String) -> BoxFuture<'_, bool, StoreError> {
        let now = Instant::now();
        let removed = self
            .entries
            .remove_if(key, |_, stored| stored.is_live(now) && stored.value == expected)
            .is_some();
        Box::pin(std::future::ready(Ok(removed)))
    }

    fn conditional_set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> BoxFuture<'_, SetOutcome, StoreError> {
        let outcome = self.set_if_absent(key, value, ttl);
        Box::pin(std::future::ready(Ok(outcome)))
    }
}
