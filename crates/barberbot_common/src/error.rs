use std::fmt;
use thiserror::Error;

/// The base error type for all Barberbot errors.
///
/// Each crate keeps its own error enum and implements `From<CrateError> for BarberbotError`,
/// so HTTP handlers only ever deal with this type.
#[derive(Error, Debug)]
pub enum BarberbotError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The request itself is malformed or not allowed
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// An external collaborator (calendar, key-value store) failed or timed out
    #[error("Service unavailable: {service_name} - {message}")]
    UnavailableError {
        service_name: String,
        message: String,
    },

    /// The requested resource is taken (e.g., a slot booked concurrently)
    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for BarberbotError {
    fn status_code(&self) -> u16 {
        match self {
            BarberbotError::ConfigError(_) => 500,
            BarberbotError::ValidationError(_) => 400,
            BarberbotError::UnavailableError { .. } => 503,
            BarberbotError::ConflictError(_) => 409,
            BarberbotError::NotFoundError(_) => 404,
            BarberbotError::InternalError(_) => 500,
        }
    }
}

impl From<serde_json::Error> for BarberbotError {
    fn from(err: serde_json::Error) -> Self {
        BarberbotError::ValidationError(err.to_string())
    }
}

impl From<std::io::Error> for BarberbotError {
    fn from(err: std::io::Error) -> Self {
        BarberbotError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> BarberbotError {
    BarberbotError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> BarberbotError {
    BarberbotError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> BarberbotError {
    BarberbotError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> BarberbotError {
    BarberbotError::ConflictError(message.to_string())
}

pub fn unavailable<T: fmt::Display>(service_name: &str, message: T) -> BarberbotError {
    BarberbotError::UnavailableError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}
