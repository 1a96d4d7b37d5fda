// --- File: crates/barberbot_store/src/sweeper.rs ---
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::memory::MemoryStore;

/// Background task that periodically drops expired entries from a [`MemoryStore`].
///
/// Expired holds are already invisible to readers; this only bounds memory.
pub fn spawn_sweeper(store: Arc<MemoryStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let purged = store.purge_expired();
            if purged > 0 {
                debug!("sweeper purged {purged} expired entries");
            }
        }
    })
}
