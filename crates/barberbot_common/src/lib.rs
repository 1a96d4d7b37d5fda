
// Declare modules within this crate
pub mod error;     // Error handling
pub mod http;      // HTTP error responses
pub mod services;  // Collaborator abstractions
pub mod logging;   // Logging utilities
pub mod features;  // Feature flag handling

// Re-export error types and utilities for easier access
pub use error::{
    BarberbotError,
    HttpStatusCode,
    config_error,
    validation_error,
    not_found,
    conflict,
    unavailable,
};

pub use http::IntoHttpResponse;

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, log_error, log_result};

pub use features::is_feature_enabled;

#[cfg(feature = "gcal")]
pub use features::is_gcal_enabled;

#[cfg(feature = "redis")]
pub use features::is_redis_enabled;
