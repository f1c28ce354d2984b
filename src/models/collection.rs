//! Saved requests grouped into named collections.

use super::request::{HttpMethod, RequestDraft};
use serde::{Deserialize, Serialize};

/// A named request saved inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRequest {
    pub id: String,
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
}

impl SavedRequest {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        method: HttpMethod,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            method,
            url: url.into(),
        }
    }

    /// A fresh draft for this saved request.
    ///
    /// Saved requests only carry method and URL, so headers, authorization
    /// and body start empty.
    pub fn to_draft(&self) -> RequestDraft {
        RequestDraft::new(self.method, self.url.clone())
    }
}

/// A named, independently collapsible group of saved requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
    #[serde(default)]
    pub requests: Vec<SavedRequest>,
}

impl Collection {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_open: None,
            requests: Vec::new(),
        }
    }

    /// Collections are expanded unless explicitly collapsed.
    pub fn is_expanded(&self) -> bool {
        self.is_open.unwrap_or(true)
    }

    /// Flips the expanded state.
    pub fn toggle(&mut self) {
        self.is_open = Some(!self.is_expanded());
    }

    pub fn find_request(&self, request_id: &str) -> Option<&SavedRequest> {
        self.requests.iter().find(|r| r.id == request_id)
    }
}

/// Finds a saved request by collection and request id.
pub fn find_saved_request<'a>(
    collections: &'a [Collection],
    collection_id: &str,
    request_id: &str,
) -> Option<&'a SavedRequest> {
    collections
        .iter()
        .find(|c| c.id == collection_id)
        .and_then(|c| c.find_request(request_id))
}
