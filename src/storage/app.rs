//! Typed access to the `collections` and `settings` sections.
//!
//! Reads never fail: a missing, unreadable or malformed section degrades to its
//! documented default and logs a warning. Writes report [`StorageError`].

use super::{StorageError, StoreBackend, COLLECTIONS_KEY, SETTINGS_KEY};
use crate::models::{Collection, SavedRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Environment selected when nothing has been saved.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Colour scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// User settings persisted under the `settings` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_opened_collection: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            environment: default_environment(),
            last_opened_collection: None,
        }
    }
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

/// Collections and settings on top of a shared backend.
#[derive(Debug)]
pub struct AppStorage<B> {
    backend: Arc<B>,
}

impl<B> Clone for AppStorage<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: StoreBackend> AppStorage<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Returns every saved collection, or an empty list.
    pub async fn collections(&self) -> Vec<Collection> {
        self.read_or_default(COLLECTIONS_KEY).await
    }

    /// Replaces the saved collections.
    pub async fn save_collections(&self, collections: &[Collection]) -> Result<(), StorageError> {
        let value = serde_json::to_value(collections)?;
        self.backend.set(COLLECTIONS_KEY, value).await
    }

    /// Flips a collection between expanded and collapsed.
    ///
    /// # Returns
    ///
    /// `Ok(Some(expanded))` with the new state, or `Ok(None)` if no collection
    /// has that id.
    pub async fn toggle_collection(&self, collection_id: &str) -> Result<Option<bool>, StorageError> {
        let mut collections = self.collections().await;
        let Some(collection) = collections.iter_mut().find(|c| c.id == collection_id) else {
            return Ok(None);
        };
        collection.toggle();
        let expanded = collection.is_expanded();
        self.save_collections(&collections).await?;
        Ok(Some(expanded))
    }

    /// Appends a saved request to a collection.
    ///
    /// Returns `Ok(false)` if no collection has that id.
    pub async fn add_saved_request(
        &self,
        collection_id: &str,
        request: SavedRequest,
    ) -> Result<bool, StorageError> {
        let mut collections = self.collections().await;
        let Some(collection) = collections.iter_mut().find(|c| c.id == collection_id) else {
            return Ok(false);
        };
        collection.requests.push(request);
        self.save_collections(&collections).await?;
        Ok(true)
    }

    /// Returns the saved settings, or the defaults.
    pub async fn settings(&self) -> Settings {
        self.read_or_default(SETTINGS_KEY).await
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<(), StorageError> {
        let value = serde_json::to_value(settings)?;
        self.backend.set(SETTINGS_KEY, value).await
    }

    /// Persists the selected environment, keeping the other settings.
    pub async fn set_environment(&self, environment: &str) -> Result<Settings, StorageError> {
        let mut settings = self.settings().await;
        settings.environment = environment.to_string();
        self.save_settings(&settings).await?;
        Ok(settings)
    }

    /// Removes every section, including history.
    pub async fn clear_all(&self) -> Result<(), StorageError> {
        self.backend.clear().await
    }

    /// Whether a section holds a value. Unreadable storage counts as absent.
    pub async fn has(&self, key: &str) -> bool {
        match self.backend.has(key).await {
            Ok(present) => present,
            Err(e) => {
                log::warn!("failed to check storage key {}: {}", key, e);
                false
            }
        }
    }

    async fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let value = match self.backend.get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => return T::default(),
            Err(e) => {
                log::warn!("failed to read {}: {}. Using defaults.", key, e);
                return T::default();
            }
        };

        serde_json::from_value(value).unwrap_or_else(|e| {
            log::warn!("stored {} are malformed: {}. Using defaults.", key, e);
            T::default()
        })
    }
}
