//! In-memory backend.
//!
//! Used by tests and by callers that want a throwaway session. Writes can be
//! made to fail on demand to exercise persistence-failure paths.

use super::{StorageError, StoreBackend};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Value>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one key.
    pub fn with_value(key: impl Into<String>, value: Value) -> Self {
        let store = Self::default();
        if let Ok(mut entries) = store.entries.write() {
            entries.insert(key.into(), value);
        }
        store
    }

    /// Makes subsequent `set` and `clear` calls fail with `StorageError::Unavailable`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `get` and `has` calls fail with `StorageError::Unavailable`.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> Result<(), StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }

    fn check_writes(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    fn poisoned() -> StorageError {
        StorageError::Unavailable("memory store lock poisoned".to_string())
    }
}

impl StoreBackend for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        self.check_reads()?;
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.check_writes()?;
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.insert(key.to_string(), value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn has(&self, key: &str) -> Result<bool, StorageError> {
        self.check_reads()?;
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.contains_key(key))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.check_writes()?;
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.clear();
        Ok(())
    }
}
