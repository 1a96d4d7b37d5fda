// --- File: crates/barberbot_store/src/memory_test.rs ---
#[cfg(test)]
mod tests {
    use crate::memory::MemoryStore;
    use crate::sweeper::spawn_sweeper;
    use barberbot_common::services::{KeyValueStore, SetOutcome};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_conditional_set_refuses_live_entry() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(300);

        let first = store
            .conditional_set("hold:carlos:a", "alice".to_string(), ttl)
            .await
            .unwrap();
        let second = store
            .conditional_set("hold:carlos:a", "bob".to_string(), ttl)
            .await
            .unwrap();

        assert_eq!(first, SetOutcome::Acquired);
        assert_eq!(second, SetOutcome::AlreadyPresent);
        assert_eq!(
            store.get("hold:carlos:a").await.unwrap().as_deref(),
            Some("alice")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_invisible_and_replaceable() {
        let store = MemoryStore::new();
        store
            .conditional_set("hold:carlos:a", "alice".to_string(), Duration::from_secs(300))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(301)).await;

        assert_eq!(store.get("hold:carlos:a").await.unwrap(), None);
        let outcome = store
            .conditional_set("hold:carlos:a", "bob".to_string(), Duration::from_secs(300))
            .await
            .unwrap();
        assert_eq!(outcome, SetOutcome::Acquired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_if_value_only_removes_matching_entry() {
        let store = MemoryStore::new();
        let ttl = Duration::from_secs(300);
        store
            .conditional_set("hold:carlos:a", "alice".to_string(), ttl)
            .await
            .unwrap();

        let wrong = store
            .delete_if_value("hold:carlos:a", "bob".to_string())
            .await
            .unwrap();
        assert!(!wrong);
        assert!(store.get("hold:carlos:a").await.unwrap().is_some());

        let right = store
            .delete_if_value("hold:carlos:a", "alice".to_string())
            .await
            .unwrap();
        assert!(right);
        assert_eq!(store.get("hold:carlos:a").await.unwrap(), None);
        assert!(!store
            .delete_if_value("hold:carlos:a", "alice".to_string())
            .await
            .unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_boundary_is_exclusive() {
        let store = MemoryStore::new();
        store
            .set("k", "v".to_string(), Duration::from_secs(10))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(store.get("k").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.delete("nothing-here").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_counts_removed_entries() {
        let store = MemoryStore::new();
        store.set("short", "a".to_string(), Duration::from_secs(1)).await.unwrap();
        store.set("long", "b".to_string(), Duration::from_secs(100)).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_reclaims_expired_entries() {
        let store = Arc::new(MemoryStore::new());
        store.set("short", "a".to_string(), Duration::from_secs(1)).await.unwrap();
        let handle = spawn_sweeper(store.clone(), Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;

        assert!(store.is_empty());
        handle.abort();
    }

    #[tokio::test]
    async fn test_concurrent_conditional_sets_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let mut tasks = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .conditional_set("hold:x", format!("holder-{i}"), Duration::from_secs(60))
                    .await
                    .unwrap()
            }));
        }
        let mut acquired = 0;
        for task in tasks {
            if task.await.unwrap() == SetOutcome::Acquired {
                acquired += 1;
            }
        }
        assert_eq!(acquired, 1);
    }
}
