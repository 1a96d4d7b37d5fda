// --- File: crates/services/barberbot_backend/src/app_state.rs ---
use std::sync::Arc;

use barberbot_booking::BookingEngine;
use barberbot_common::services::ServiceFactory;
use barberbot_common::BarberbotError;
use barberbot_config::AppConfig;

use crate::service_factory::BarberbotServiceFactory;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<BookingEngine>,
    /// Owns the collaborators (and the in-memory sweeper) for the lifetime of the server.
    pub service_factory: Arc<dyn ServiceFactory>,
}

impl AppState {
    /// Create the state from configuration, connecting the configured integrations.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, BarberbotError> {
        let service_factory = Arc::new(BarberbotServiceFactory::new(config.clone()).await?);
        Self::from_parts(config, service_factory)
    }

    /// Build the booking engine over an existing factory.
    pub fn from_parts(
        config: Arc<AppConfig>,
        service_factory: Arc<dyn ServiceFactory>,
    ) -> Result<Self, BarberbotError> {
        let engine = BookingEngine::from_config(
            &config.business,
            &config.booking,
            service_factory.calendar_service(),
            service_factory.key_value_store(),
        )?;
        Ok(Self::with_engine(config, engine, service_factory))
    }

    /// Wrap an already built engine, e.g. one with a pinned clock.
    pub fn with_engine(
        config: Arc<AppConfig>,
        engine: BookingEngine,
        service_factory: Arc<dyn ServiceFactory>,
    ) -> Self {
        Self {
            config,
            engine: Arc::new(engine),
            service_factory,
        }
    }
}
