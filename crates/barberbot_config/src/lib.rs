use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::Path;
use tracing::{debug, warn};
pub mod models;
pub use models::*;

/// Loads the configuration from `CONFIG_DIR` (default `config/`).
///
/// Layers, lowest priority first: `default.toml`, `<RUN_ENV>.toml`, then
/// `BARBERBOT__SECTION__KEY` environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();
    let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    load_config_from(Path::new(&config_dir))
}

/// Loads the configuration from an explicit directory.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "BARBERBOT".to_string());

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        "loading config: default={}, env={}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Recursively replaces all "secret_from_env" string values with environment variable values
fn inject_env_secrets(value: &mut Value) {
    fn walk(path: Vec<String>, obj: &mut Value) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    walk(new_path, v);
                }
            }
            Value::String(s) if s == "secret_from_env" => {
                let env_key = path.join("_").to_uppercase();
                if let Ok(env_val) = std::env::var(&env_key) {
                    *obj = Value::String(env_val);
                } else {
                    warn!("env var {} not found for secret_from_env", env_key);
                }
            }
            _ => {}
        }
    }

    walk(vec![], value);
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("config is not serializable: {err}")))?;
    inject_env_secrets(&mut json);
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("config invalid after env overrides: {err}")))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The path comes from `DOTENV_OVERRIDE`, else from a first command line argument starting
/// with `.env`, else `.env`. Loading happens once per process; the chosen path is returned.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = std::env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn shipped_config_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config")
    }

    #[test]
    fn test_load_shipped_default_config() {
        let config = load_config_from(&shipped_config_dir()).expect("default config must load");

        assert_eq!(config.business.timezone, "Europe/Madrid");
        assert!(!config.business.services.is_empty());
        assert!(config.business.business_hours.contains_key("monday"));
        assert!(config.business.business_hours["sunday"].closed);
        assert_eq!(config.booking.slot_interval_minutes, 15);
        assert_eq!(config.booking.hold_ttl_seconds, 300);
    }

    #[test]
    fn test_booking_settings_default_when_section_missing() {
        let settings: BookingSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.buffer_minutes, 10);
        assert_eq!(settings.advance_booking_days, 30);
        assert_eq!(settings.default_range_days, 7);
    }

    #[test]
    fn test_secret_marker_replaced_from_env() {
        std::env::set_var("REDIS_URL", "redis://cache.internal:6379");
        let mut config = load_config_from(&shipped_config_dir()).unwrap();
        config.redis = Some(RedisConfig {
            url: "secret_from_env".to_string(),
            pool_size: None,
        });

        let config = apply_env_overrides_from_marker(config).unwrap();
        assert_eq!(
            config.redis.map(|r| r.url).as_deref(),
            Some("redis://cache.internal:6379")
        );
    }
}
