//! HTTP response data models.
//!
//! [`ResponseData`] is what the response viewer renders. Every execution
//! produces one, including failed and cancelled ones, which carry status `0`
//! and a human-readable message as their body.

use super::headers::HeaderList;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body text shown for an execution cancelled before it settled.
pub const CANCELLED_MESSAGE: &str = "Request cancelled";

/// Body text shown when a failure carries no message of its own.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Classified response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// Any other body, or a synthetic status message.
    ///
    /// Listed first so a bare JSON string reads back as text.
    Text(String),
    /// Parsed body of a response whose content type indicates JSON.
    Json(Value),
}

impl ResponseBody {
    /// Serializes the body into the string form kept in history.
    pub fn to_stored_string(&self) -> String {
        match self {
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Text(text) => text.clone(),
        }
    }
}

impl Default for ResponseBody {
    fn default() -> Self {
        ResponseBody::Text(String::new())
    }
}

/// A response as displayed by the viewer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    /// HTTP status code, or `0` for failed and cancelled executions.
    pub status: u16,

    /// Canonical reason phrase (empty for synthetic responses).
    pub status_text: String,

    /// Response headers in transport order.
    pub headers: HeaderList,

    /// Parsed JSON or text.
    pub data: ResponseBody,

    /// Wall-clock milliseconds from execution start to settlement.
    pub time_ms: u64,
}

impl ResponseData {
    /// Builds a zero-status response carrying `message` as its body.
    pub fn synthetic(message: impl Into<String>, time_ms: u64) -> Self {
        Self {
            status: 0,
            status_text: String::new(),
            headers: HeaderList::new(),
            data: ResponseBody::Text(message.into()),
            time_ms,
        }
    }

    /// Whether this response stands in for a failure or cancellation.
    pub fn is_synthetic(&self) -> bool {
        self.status == 0
    }

    /// Gets the Content-Type header value if present.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get_ignore_case("content-type")
    }
}

/// Whether a content type denotes a JSON body.
pub fn is_json_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("application/json")
}
