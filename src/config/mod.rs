//! Configuration management.
//!
//! Settings are read from the "rest-composer" key of a JSON settings document,
//! merged over defaults, validated, and kept in a process-wide slot that the
//! engine and the command-line front end read from.

pub mod schema;

pub use schema::{ComposerConfig, ConcurrentSendPolicy};

use once_cell::sync::Lazy;
use serde_json::Value;
use std::path::Path;
use std::sync::RwLock;

/// Key under which settings live in a settings document.
pub const SETTINGS_KEY: &str = "rest-composer";

static CONFIG: Lazy<RwLock<ComposerConfig>> =
    Lazy::new(|| RwLock::new(ComposerConfig::default()));

/// Loads configuration from a settings document.
///
/// Settings that fail to parse are ignored with a warning and defaults are
/// used. On success the global configuration is replaced.
///
/// # Arguments
///
/// * `settings_json` - Optional settings document holding a "rest-composer" object
///
/// # Returns
///
/// `Ok(ComposerConfig)` with the loaded configuration, or `Err` if validation fails.
///
/// # Example
///
/// ```no_run
/// use rest_composer::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "rest-composer": {
///         "timeout": 60000,
///         "validateSsl": false
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.timeout, 60000);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<ComposerConfig, String> {
    let mut config = ComposerConfig::default();

    if let Some(user_settings) = settings_json.as_ref().and_then(|s| s.get(SETTINGS_KEY)) {
        match serde_json::from_value::<ComposerConfig>(user_settings.clone()) {
            Ok(user_config) => config = user_config,
            Err(e) => {
                log::warn!(
                    "Failed to parse {} settings: {}. Using defaults.",
                    SETTINGS_KEY,
                    e
                );
            }
        }
    }

    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {}. Using defaults.", e))?;

    if let Ok(mut global_config) = CONFIG.write() {
        *global_config = config.clone();
    }

    Ok(config)
}

/// Loads configuration from a settings file on disk.
///
/// A missing file is not an error: defaults are installed.
pub fn load_config_file(path: &Path) -> Result<ComposerConfig, String> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return load_config(None),
        Err(e) => return Err(format!("Failed to read {}: {}", path.display(), e)),
    };

    let settings: Value = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    load_config(Some(settings))
}

/// Gets a clone of the current global configuration.
///
/// Returns defaults if nothing has been loaded.
pub fn get_config() -> ComposerConfig {
    CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_else(|_| ComposerConfig::default())
}

/// Updates the global configuration in place.
///
/// If the result fails validation, defaults are restored.
///
/// # Example
///
/// ```no_run
/// use rest_composer::config::update_config;
///
/// update_config(|config| {
///     config.timeout = 60000;
/// });
/// ```
pub fn update_config<F>(updater: F)
where
    F: FnOnce(&mut ComposerConfig),
{
    if let Ok(mut config) = CONFIG.write() {
        updater(&mut config);

        if let Err(e) = config.validate() {
            log::warn!("Configuration validation failed after update: {}", e);
            *config = ComposerConfig::default();
        }
    }
}

/// Resets the global configuration to defaults.
pub fn reset_config() {
    if let Ok(mut config) = CONFIG.write() {
        *config = ComposerConfig::default();
    }
}
