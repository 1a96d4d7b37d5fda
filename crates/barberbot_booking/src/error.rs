// --- File: crates/barberbot_booking/src/error.rs ---
use barberbot_common::services::{CalendarError, StoreError};
use barberbot_common::{
    config_error, conflict, not_found, unavailable, validation_error, BarberbotError, HttpStatusCode,
};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// The collaborator a failed call went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Calendar,
    Store,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Calendar => write!(f, "calendar"),
            Backend::Store => write!(f, "key-value store"),
        }
    }
}

#[derive(Error, Debug)]
pub enum BookingError {
    /// Business hours or catalog missing or malformed.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A collaborator call failed or timed out. Never retried inside the core.
    #[error("{backend} unavailable: {message}")]
    BackendUnavailable { backend: Backend, message: String },

    #[error("Slot no longer available: {0}")]
    SlotNoLongerAvailable(String),

    /// Rejected before any calendar or hold call was made.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl BookingError {
    pub fn invalid<T: fmt::Display>(message: T) -> Self {
        BookingError::InvalidRequest(message.to_string())
    }

    pub fn configuration<T: fmt::Display>(message: T) -> Self {
        BookingError::Configuration(message.to_string())
    }
}

impl From<CalendarError> for BookingError {
    fn from(err: CalendarError) -> Self {
        BookingError::BackendUnavailable {
            backend: Backend::Calendar,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        BookingError::BackendUnavailable {
            backend: Backend::Store,
            message: err.to_string(),
        }
    }
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::Configuration(_) => 500,
            BookingError::BackendUnavailable { .. } => 503,
            BookingError::SlotNoLongerAvailable(_) => 409,
            BookingError::InvalidRequest(_) => 400,
            BookingError::NotFound(_) => 404,
        }
    }
}

impl From<BookingError> for BarberbotError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Configuration(msg) => config_error(msg),
            BookingError::BackendUnavailable { backend, message } => {
                unavailable(&backend.to_string(), message)
            }
            BookingError::SlotNoLongerAvailable(msg) => conflict(msg),
            BookingError::InvalidRequest(msg) => validation_error(msg),
            BookingError::NotFound(msg) => not_found(msg),
        }
    }
}

/// Run a collaborator call under `limit`; a timeout counts as the backend being unavailable.
pub(crate) async fn bounded<T, E, F>(backend: Backend, limit: Duration, call: F) -> Result<T, BookingError>
where
    F: Future<Output = Result<T, E>>,
    BookingError: From<E>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(BookingError::from),
        Err(_) => Err(BookingError::BackendUnavailable {
            backend,
            message: format!("timed out after {}ms", limit.as_millis()),
        }),
    }
}
