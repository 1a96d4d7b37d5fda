// --- File: crates/barberbot_store/src/redis.rs ---
//! Redis-backed [`KeyValueStore`].
//!
//! Set-if-absent maps onto `SET key value NX PX ttl`, which Redis executes atomically, so
//! holds stay exclusive across every process sharing the server. Releasing a hold runs a
//! compare-and-delete script so only the value's writer can remove it.

use barberbot_common::services::{BoxFuture, KeyValueStore, SetOutcome, StoreError};
use barberbot_config::RedisConfig;
use bb8_redis::bb8::Pool;
use bb8_redis::redis;
use bb8_redis::RedisConnectionManager;
use std::time::Duration;
use tracing::info;

const DEFAULT_POOL_SIZE: u32 = 8;

/// Delete KEYS[1] only if it still holds ARGV[1].
const COMPARE_AND_DELETE: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
end
return 0
"#;

pub struct RedisStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisStore {
    pub async fn connect(config: &RedisConfig) -> Result<Self, StoreError> {
        let manager = RedisConnectionManager::new(config.url.as_str())
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let max_size = config.pool_size.unwrap_or(DEFAULT_POOL_SIZE);
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        info!("Connected Redis pool (max_size={})", max_size);
        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<bb8_redis::bb8::PooledConnection<'_, RedisConnectionManager>, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

/// Redis rejects `PX 0`; sub-millisecond TTLs round up.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn command_error(err: redis::RedisError) -> StoreError {
    StoreError::Command(err.to_string())
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Option<String>, StoreError> {
        let key = key.to_string();
        Box::pin(async move {
            let mut conn = self.connection().await?;
            let value: Option<String> = redis::cmd("GET")
                .arg(&key)
                .query_async(&mut *conn)
                .await
                .map_err(command_error)?;
            Ok(value)
        })
    }

    fn set(&self, key: &str, value: String, ttl: Duration) -> BoxFuture<'_, (), StoreError> {
        let key = key.to_string();
        Box::pin(async move {
            let mut conn = self.connection().await?;
            let _: () = redis::cmd("SET")
                .arg(&key)
                .arg(value)
                .arg("PX")
                .arg(ttl_millis(ttl))
                .query_async(&mut *conn)
                .await
                .map_err(command_error)?;
            Ok(())
        })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, (), StoreError> {
        let key = key.to_string();
        Box::pin(async move {
            let mut conn = self.connection().await?;
            let _: i64 = redis::cmd("DEL")
                .arg(&key)
                .query_async(&mut *conn)
                .await
                .map_err(command_error)?;
            Ok(())
        })
    }

    fn delete_if_value(&self, key: &str, expected: String) -> BoxFuture<'_, bool, StoreError> {
        let key = key.to_string();
        Box::pin(async move {
            let mut conn = self.connection().await?;
            let removed: i64 = redis::cmd("EVAL")
                .arg(COMPARE_AND_DELETE)
                .arg(1)
                .arg(&key)
                .arg(expected)
                .query_async(&mut *conn)
                .await
                .map_err(command_error)?;
            Ok(removed > 0)
        })
    }

    fn conditional_set(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
    ) -> BoxFuture<'_, SetOutcome, StoreError> {
        let key = key.to_string();
        Box::pin(async move {
            let mut conn = self.connection().await?;
            let reply: Option<String> = redis::cmd("SET")
                .arg(&key)
                .arg(value)
                .arg("NX")
                .arg("PX")
                .arg(ttl_millis(ttl))
                .query_async(&mut *conn)
                .await
                .map_err(command_error)?;
            Ok(match reply {
                Some(_) => SetOutcome::Acquired,
                None => SetOutcome::AlreadyPresent,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_millis_never_zero() {
        assert_eq!(ttl_millis(Duration::ZERO), 1);
        assert_eq!(ttl_millis(Duration::from_secs(300)), 300_000);
    }
}
