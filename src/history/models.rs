//! Data models for the outcome history.
//!
//! An [`OutcomeRecord`] is one execution attempt as it is persisted: the
//! request that went out, the response (real or synthetic), metadata about
//! where the request came from, and an error block for transport failures.
//! The engine produces a [`NewOutcomeRecord`]; the store completes it with an
//! id and a timestamp.

use crate::models::{HeaderList, HttpMethod, ResponseBody, ResponseData};
use crate::models::response::is_json_content_type;
use crate::storage::StorageError;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of records kept in the log.
pub const HISTORY_CAPACITY: usize = 100;

const ID_SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// The request as it went over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedRequest {
    pub url: String,
    pub method: HttpMethod,
    /// Resolved headers: deduplicated, blank rows removed, authorization applied.
    pub headers: HeaderList,
    /// Present only for methods that carry a body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Query parameters parsed from the URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<HeaderList>,
}

/// The response as it is persisted. The body is kept in serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Body length in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub time_ms: u64,
}

impl RecordedResponse {
    /// Captures a displayed response for storage.
    pub fn from_response(response: &ResponseData) -> Self {
        let body = response.data.to_stored_string();
        Self {
            status: response.status,
            status_text: response.status_text.clone(),
            headers: response.headers.clone(),
            size: Some(body.len() as u64),
            body: Some(body),
            time_ms: response.time_ms,
        }
    }

    /// Rebuilds a displayable response.
    ///
    /// Bodies of JSON responses are parsed back; anything that fails to parse
    /// is shown as text.
    pub fn to_response_data(&self) -> ResponseData {
        let text = self.body.clone().unwrap_or_default();
        let is_json = self.status != 0
            && self
                .headers
                .get_ignore_case("content-type")
                .is_some_and(is_json_content_type);

        let data = if is_json {
            serde_json::from_str(&text)
                .map(ResponseBody::Json)
                .unwrap_or(ResponseBody::Text(text))
        } else {
            ResponseBody::Text(text)
        };

        ResponseData {
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            data,
            time_ms: self.time_ms,
        }
    }
}

/// Where a request came from and how it was run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeMetadata {
    /// Set only when launched from a saved request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    /// Set only when launched from a saved request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Display name, usually the saved request's name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl OutcomeMetadata {
    /// Adds a tag unless it is already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        let tags = self.tags.get_or_insert_with(Vec::new);
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    pub fn remove_tag(&mut self, tag: &str) {
        if let Some(tags) = self.tags.as_mut() {
            tags.retain(|t| t != tag);
            if tags.is_empty() {
                self.tags = None;
            }
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }
}

/// Failure details for a transport error. Absent on success and cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// An outcome before the store has assigned an id and a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOutcomeRecord {
    pub request: RecordedRequest,
    pub response: RecordedResponse,
    #[serde(default)]
    pub metadata: OutcomeMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

/// One persisted execution attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// `hist_<epoch ms>_<9 base-36 chars>`.
    pub id: String,

    /// Insertion instant, stored as epoch milliseconds.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    pub request: RecordedRequest,
    pub response: RecordedResponse,
    #[serde(default)]
    pub metadata: OutcomeMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OutcomeError>,
}

impl OutcomeRecord {
    /// Completes a new outcome with an id and timestamp.
    pub fn from_new(entry: NewOutcomeRecord, id: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            timestamp,
            request: entry.request,
            response: entry.response,
            metadata: entry.metadata,
            error: entry.error,
        }
    }

    /// Whether the execution ended in a transport failure.
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Display name, falling back to the URL.
    pub fn display_name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or(&self.request.url)
    }
}

/// Generates a history record id for the given instant.
pub fn generate_history_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_SUFFIX_ALPHABET[rng.gen_range(0..ID_SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("hist_{}_{}", now.timestamp_millis(), suffix)
}

/// Errors that can occur during history operations.
#[derive(Debug)]
pub enum HistoryError {
    /// The backend failed to persist the log.
    StorageError(StorageError),

    /// The log could not be converted to or from its stored form.
    SerializationError(serde_json::Error),
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::StorageError(err) => write!(f, "History storage error: {}", err),
            HistoryError::SerializationError(err) => {
                write!(f, "History serialization error: {}", err)
            }
        }
    }
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HistoryError::StorageError(err) => Some(err),
            HistoryError::SerializationError(err) => Some(err),
        }
    }
}

impl From<StorageError> for HistoryError {
    fn from(err: StorageError) -> Self {
        HistoryError::StorageError(err)
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(err: serde_json::Error) -> Self {
        HistoryError::SerializationError(err)
    }
}
