//! Configuration schema for the REST composer.
//!
//! Defines the settings structure and its validation rules.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure.
///
/// Read from the "rest-composer" key of a settings document. Missing settings
/// fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerConfig {
    /// Request timeout in milliseconds.
    ///
    /// Covers connection, headers and body download. Defaults to 30000ms.
    /// Must be greater than 0.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Whether to follow 3xx redirects. Defaults to true.
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Maximum number of redirects to follow when `follow_redirects` is on.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Whether to validate TLS certificates. Defaults to true.
    ///
    /// **Warning:** Disabling validation accepts self-signed and expired
    /// certificates.
    #[serde(default = "default_validate_ssl")]
    pub validate_ssl: bool,

    /// `User-Agent` sent with every request unless the draft sets its own.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// What happens when a send starts while another is still in flight.
    #[serde(default)]
    pub concurrent_sends: ConcurrentSendPolicy,

    /// Location of the storage file. `None` uses the per-user default.
    #[serde(default)]
    pub storage_file: Option<PathBuf>,
}

/// Behaviour of a send started while another one is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConcurrentSendPolicy {
    /// Refuse the new send.
    Reject,
    /// Cancel every in-flight send, then start the new one.
    #[default]
    CancelPrevious,
    /// Let all sends run; the most recently started one owns the display.
    LatestWins,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            follow_redirects: default_follow_redirects(),
            max_redirects: default_max_redirects(),
            validate_ssl: default_validate_ssl(),
            user_agent: default_user_agent(),
            concurrent_sends: ConcurrentSendPolicy::default(),
            storage_file: None,
        }
    }
}

impl ComposerConfig {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all settings are valid, or `Err` with a descriptive message.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout == 0 {
            return Err("timeout must be greater than 0".to_string());
        }

        if self.user_agent.trim().is_empty() {
            return Err("userAgent must not be empty".to_string());
        }

        Ok(())
    }

    /// Returns the timeout as a `std::time::Duration`.
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout)
    }
}

fn default_timeout() -> u64 {
    30000
}

fn default_follow_redirects() -> bool {
    true
}

fn default_max_redirects() -> u32 {
    10
}

fn default_validate_ssl() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("rest-composer/{}", env!("CARGO_PKG_VERSION"))
}
