//! JSON file backend.
//!
//! The whole document lives in one JSON object on disk. Every write reads the
//! current document, replaces one key, writes the result to a temporary file
//! next to the target and renames it into place.

use super::{StorageError, StoreBackend};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const STORAGE_FILE_NAME: &str = "app-storage.json";

/// Gets the default storage file path.
///
/// Returns `~/.config/rest-composer/app-storage.json` on Unix-like systems,
/// or the roaming application data equivalent on Windows. The directory is
/// not created here; [`FileStore`] creates it on first write.
///
/// # Errors
///
/// Returns `StorageError::Io` if no home directory can be determined.
pub fn default_storage_path() -> Result<PathBuf, StorageError> {
    let config_dir = if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".config")
    } else if let Some(user_profile) = std::env::var_os("USERPROFILE") {
        PathBuf::from(user_profile).join("AppData").join("Roaming")
    } else {
        return Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        )));
    };

    Ok(config_dir.join("rest-composer").join(STORAGE_FILE_NAME))
}

/// Storage backed by a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within the process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Opens the store at [`default_storage_path`].
    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self::new(default_storage_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Map<String, Value>, StorageError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents)? {
            Value::Object(map) => Ok(map),
            other => Err(StorageError::Corrupt(format!(
                "expected a JSON object in {}, found {}",
                self.path.display(),
                json_kind(&other)
            ))),
        }
    }

    async fn write_document(&self, document: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(document)?;
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        log::debug!("wrote storage document to {}", self.path.display());
        Ok(())
    }
}

impl StoreBackend for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let mut document = self.read_document().await?;
        Ok(document.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        document.insert(key.to_string(), value);
        self.write_document(&document).await
    }

    async fn has(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.read_document().await?.contains_key(key))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
