//! The persisted outcome log.
//!
//! The log lives under the `history` key of a [`StoreBackend`] as one JSON
//! array, newest first, never longer than [`HISTORY_CAPACITY`]. It is loaded
//! on first access and cached for the lifetime of the store. Every mutation
//! rewrites the whole array.
//!
//! A single async mutex guards the cache and is held across the backend write,
//! so appends are serialized and readers observe either the log before an
//! append or the log after it.

use super::models::{
    generate_history_id, HistoryError, NewOutcomeRecord, OutcomeRecord, HISTORY_CAPACITY,
};
use super::search::{filter_history, HistoryFilter};
use crate::storage::{StoreBackend, HISTORY_KEY};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Capacity-bounded, newest-first outcome log.
#[derive(Debug)]
pub struct HistoryStore<B> {
    backend: Arc<B>,
    cache: Mutex<Option<Vec<OutcomeRecord>>>,
}

impl<B: StoreBackend> HistoryStore<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            cache: Mutex::new(None),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Records an outcome.
    ///
    /// Assigns a fresh id and the current timestamp, prepends the record,
    /// evicts anything beyond the capacity and persists the result.
    ///
    /// # Returns
    ///
    /// The completed record.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError` if the log cannot be written. The cached log is
    /// left as it was before the call.
    pub async fn append(&self, entry: NewOutcomeRecord) -> Result<OutcomeRecord, HistoryError> {
        let mut cache = self.cache.lock().await;
        let current = match cache.take() {
            Some(entries) => entries,
            None => self.load().await,
        };

        let now = now_millis();
        let record = OutcomeRecord::from_new(entry, generate_history_id(now), now);

        let mut updated = Vec::with_capacity(HISTORY_CAPACITY);
        updated.push(record.clone());
        updated.extend(current.iter().take(HISTORY_CAPACITY - 1).cloned());

        match self.persist(&updated).await {
            Ok(()) => {
                log::debug!(
                    "recorded {} {} as {} ({} entries)",
                    record.request.method,
                    record.request.url,
                    record.id,
                    updated.len()
                );
                *cache = Some(updated);
                Ok(record)
            }
            Err(e) => {
                log::error!("failed to persist history entry: {}", e);
                *cache = Some(current);
                Err(e)
            }
        }
    }

    /// Returns the log, newest first.
    ///
    /// Storage that cannot be read degrades to an empty log.
    pub async fn list(&self) -> Vec<OutcomeRecord> {
        let mut cache = self.cache.lock().await;
        if cache.is_none() {
            *cache = Some(self.load().await);
        }
        cache.clone().unwrap_or_default()
    }

    /// Number of records in the log.
    pub async fn len(&self) -> usize {
        self.list().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Looks up a record by id.
    pub async fn get(&self, id: &str) -> Option<OutcomeRecord> {
        self.list().await.into_iter().find(|record| record.id == id)
    }

    /// Replaces the persisted log with an empty one.
    pub async fn clear(&self) -> Result<(), HistoryError> {
        let mut cache = self.cache.lock().await;
        self.persist(&[]).await?;
        *cache = Some(Vec::new());
        log::debug!("cleared history");
        Ok(())
    }

    /// Records matching `filter`, newest first.
    pub async fn filter(&self, filter: &HistoryFilter) -> Vec<OutcomeRecord> {
        filter_history(&self.list().await, filter)
    }

    /// Drops the cache so the next access reloads from storage.
    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    async fn persist(&self, entries: &[OutcomeRecord]) -> Result<(), HistoryError> {
        let value = serde_json::to_value(entries)?;
        self.backend.set(HISTORY_KEY, value).await?;
        Ok(())
    }

    async fn load(&self) -> Vec<OutcomeRecord> {
        let value = match self.backend.get(HISTORY_KEY).await {
            Ok(Some(value)) => value,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("failed to load history: {}. Starting empty.", e);
                return Vec::new();
            }
        };

        let Value::Array(items) = value else {
            log::warn!("stored history is not an array. Starting empty.");
            return Vec::new();
        };

        let mut entries = Vec::with_capacity(items.len().min(HISTORY_CAPACITY));
        let mut skipped = 0;
        for item in items {
            match serde_json::from_value::<OutcomeRecord>(item) {
                Ok(entry) => entries.push(entry),
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            log::warn!("skipped {} malformed history entries", skipped);
        }

        entries.truncate(HISTORY_CAPACITY);
        entries
    }
}

/// The current instant at millisecond precision, matching the stored form.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.timestamp_millis_opt(now.timestamp_millis())
        .single()
        .unwrap_or(now)
}
