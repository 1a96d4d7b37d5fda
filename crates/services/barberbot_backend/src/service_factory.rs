// --- File: crates/services/barberbot_backend/src/service_factory.rs ---
//! Service factory implementation.
//!
//! Picks the collaborators the booking core talks to. Each integration needs its cargo
//! feature compiled in, its `use_*` flag set and its configuration section present;
//! otherwise the in-process implementation is used.
use barberbot_common::services::{
    memory::InMemoryCalendar, CalendarService, KeyValueStore, ServiceFactory,
};
use barberbot_common::BarberbotError;
use barberbot_config::AppConfig;
use barberbot_store::{spawn_sweeper, MemoryStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

#[cfg(feature = "gcal")]
use {
    barberbot_common::{config_error, is_gcal_enabled},
    barberbot_gcal::{create_calendar_hub, GoogleCalendarService},
    chrono_tz::Tz,
};

#[cfg(feature = "redis")]
use {
    barberbot_common::{is_redis_enabled, unavailable},
    barberbot_store::RedisStore,
};

/// How often the in-memory store drops expired holds.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub struct BarberbotServiceFactory {
    calendar_service: Arc<dyn CalendarService>,
    key_value_store: Arc<dyn KeyValueStore>,
    sweeper: Option<JoinHandle<()>>,
}

impl BarberbotServiceFactory {
    /// Create a new service factory.
    ///
    /// A configured integration that cannot be reached is an error: silently falling back
    /// to an empty in-memory calendar would report every slot as free.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, BarberbotError> {
        let calendar_service = Self::build_calendar(&config).await?;
        let (key_value_store, sweeper) = Self::build_store(&config).await?;
        Ok(Self {
            calendar_service,
            key_value_store,
            sweeper,
        })
    }

    /// A factory over explicit collaborators, used by tests and embedders.
    pub fn from_services(
        calendar_service: Arc<dyn CalendarService>,
        key_value_store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            calendar_service,
            key_value_store,
            sweeper: None,
        }
    }

    #[allow(unused_variables)]
    async fn build_calendar(config: &AppConfig) -> Result<Arc<dyn CalendarService>, BarberbotError> {
        #[cfg(feature = "gcal")]
        if let (true, Some(gcal_config)) = (is_gcal_enabled(config), config.gcal.as_ref()) {
            info!("Initializing Google Calendar service...");
            let timezone: Tz = config.business.timezone.parse().map_err(|_| {
                config_error(format!("unknown timezone '{}'", config.business.timezone))
            })?;
            let hub = create_calendar_hub(gcal_config)
                .await
                .map_err(|e| config_error(format!("Google Calendar auth failed: {e}")))?;
            return Ok(Arc::new(GoogleCalendarService::new(Arc::new(hub), timezone)));
        }

        info!("Using in-memory calendar");
        Ok(Arc::new(InMemoryCalendar::new()))
    }

    #[allow(unused_variables)]
    async fn build_store(
        config: &AppConfig,
    ) -> Result<(Arc<dyn KeyValueStore>, Option<JoinHandle<()>>), BarberbotError> {
        #[cfg(feature = "redis")]
        if let (true, Some(redis_config)) = (is_redis_enabled(config), config.redis.as_ref()) {
            info!("Connecting to Redis...");
            let store = RedisStore::connect(redis_config)
                .await
                .map_err(|e| unavailable("redis", e))?;
            return Ok((Arc::new(store), None));
        }

        info!("Using in-memory key-value store");
        let store = Arc::new(MemoryStore::new());
        let sweeper = spawn_sweeper(store.clone(), SWEEP_INTERVAL);
        Ok((store, Some(sweeper)))
    }
}

impl ServiceFactory for BarberbotServiceFactory {
    fn calendar_service(&self) -> Arc<dyn CalendarService> {
        self.calendar_service.clone()
    }

    fn key_value_store(&self) -> Arc<dyn KeyValueStore> {
        self.key_value_store.clone()
    }
}

impl Drop for BarberbotServiceFactory {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}
