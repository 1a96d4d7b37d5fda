//! Feature flag handling for Barberbot.
//!
//! Integrations are switched on twice: at compile time with a cargo feature
//! (`gcal`, `redis`) and at runtime with a `use_*` flag plus a configuration section.
//! Without both, the service factory falls back to the in-process implementations.

use barberbot_config::AppConfig;

/// Check if a feature is enabled at runtime based on configuration.
///
/// `true` only when the flag is set and its configuration section is present.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

/// Check if the Google Calendar adapter is enabled at runtime.
#[cfg(feature = "gcal")]
pub fn is_gcal_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_gcal, config.gcal.as_ref())
}

/// Check if the Redis store is enabled at runtime.
#[cfg(feature = "redis")]
pub fn is_redis_enabled(config: &AppConfig) -> bool {
    is_feature_enabled(config.use_redis, config.redis.as_ref())
}

/// Names of the runtime integrations that are switched on, for startup logging.
pub fn enabled_integrations(config: &AppConfig) -> Vec<&'static str> {
    let mut enabled = Vec::new();
    if is_feature_enabled(config.use_gcal, config.gcal.as_ref()) {
        enabled.push("gcal");
    }
    if is_feature_enabled(config.use_redis, config.redis.as_ref()) {
        enabled.push("redis");
    }
    enabled
}
