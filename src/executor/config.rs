//! HTTP request execution configuration.
//!
//! Transport settings the engine's client is built with. The defaults come
//! from the global [`ComposerConfig`](crate::config::ComposerConfig).

use crate::config::{get_config, ComposerConfig};
use std::time::Duration;

/// Configuration for HTTP request execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Maximum time for a complete exchange, connection through body.
    pub timeout: Duration,

    pub follow_redirects: bool,

    /// Only consulted when `follow_redirects` is set.
    pub max_redirects: u32,

    /// Whether invalid TLS certificates fail the request.
    pub validate_ssl: bool,

    /// Default `User-Agent`; a draft header of the same name wins.
    pub user_agent: String,
}

impl ExecutionConfig {
    /// Creates a configuration with the given timeout and default everything else.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Timeout for a complete exchange
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::from_config(&ComposerConfig::default())
        }
    }

    /// Derives execution settings from a composer configuration.
    pub fn from_config(config: &ComposerConfig) -> Self {
        Self {
            timeout: config.timeout_duration(),
            follow_redirects: config.follow_redirects,
            max_redirects: config.max_redirects,
            validate_ssl: config.validate_ssl,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Creates an ExecutionConfig from the global configuration.
    pub fn from_global_config() -> Self {
        Self::from_config(&get_config())
    }

    /// Timeout in whole seconds, rounded up.
    pub fn timeout_secs(&self) -> u64 {
        let millis = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        millis.div_ceil(1000)
    }
}

impl Default for ExecutionConfig {
    /// Reads the global configuration.
    fn default() -> Self {
        Self::from_global_config()
    }
}
