//! Persisted application state.
//!
//! State is a single keyed document with three sections: `collections`,
//! `history` and `settings`. A [`StoreBackend`] reads and writes whole
//! sections as JSON values; every write replaces the section wholesale.
//!
//! Two backends are provided: [`FileStore`] keeps the document in a JSON file
//! and [`MemoryStore`] keeps it in memory.

pub mod app;
pub mod file;
pub mod memory;

pub use app::{AppStorage, Settings, Theme};
pub use file::{default_storage_path, FileStore};
pub use memory::MemoryStore;

use serde_json::Value;
use std::fmt;
use std::future::Future;

/// Key of the saved-request tree.
pub const COLLECTIONS_KEY: &str = "collections";

/// Key of the outcome log.
pub const HISTORY_KEY: &str = "history";

/// Key of the user settings object.
pub const SETTINGS_KEY: &str = "settings";

/// Keyed JSON blob storage.
///
/// Implementations must make each `set` atomic: a reader sees either the old
/// or the new value of a key, never a partial write.
pub trait StoreBackend: Send + Sync {
    /// Reads a key. A missing key yields `Ok(None)`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Value>, StorageError>> + Send;

    /// Replaces the value stored under a key.
    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Whether a key currently holds a value.
    fn has(&self, key: &str) -> impl Future<Output = Result<bool, StorageError>> + Send;

    /// Removes every key.
    fn clear(&self) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Errors raised by a storage backend.
#[derive(Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    Io(std::io::Error),

    /// The stored document is not valid JSON, or a value failed to convert.
    Serialization(serde_json::Error),

    /// The stored document is valid JSON but not an object.
    Corrupt(String),

    /// The backend refused the operation.
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "Storage I/O error: {}", err),
            StorageError::Serialization(err) => write!(f, "Storage serialization error: {}", err),
            StorageError::Corrupt(msg) => write!(f, "Storage is corrupt: {}", msg),
            StorageError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(err) => Some(err),
            StorageError::Serialization(err) => Some(err),
            StorageError::Corrupt(_) | StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err)
    }
}
