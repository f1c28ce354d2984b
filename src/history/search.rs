//! Filtering over the outcome log.
//!
//! A [`HistoryFilter`] is a set of optional predicates. Every predicate that
//! is set must hold for a record to match; unset ones are ignored. Filtering
//! never mutates or reorders the log.

use super::models::OutcomeRecord;
use crate::models::HttpMethod;
use chrono::{DateTime, Utc};

/// Conjunctive predicate set over outcome records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Earliest timestamp to include (inclusive).
    pub start: Option<DateTime<Utc>>,
    /// Latest timestamp to include (inclusive).
    pub end: Option<DateTime<Utc>>,
    pub method: Option<HttpMethod>,
    /// Case-insensitive substring of the URL or the display name.
    pub search: Option<String>,
    pub environment: Option<String>,
    /// A record matches if it carries any of these tags.
    pub tags: Vec<String>,
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn since(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn until(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Whether no predicate would reject anything.
    pub fn is_empty(&self) -> bool {
        self.start.is_none()
            && self.end.is_none()
            && self.method.is_none()
            && non_empty(&self.search).is_none()
            && non_empty(&self.environment).is_none()
            && self.tags.is_empty()
    }

    /// Checks one record against every set predicate.
    pub fn matches(&self, record: &OutcomeRecord) -> bool {
        if self.start.is_some_and(|start| record.timestamp < start) {
            return false;
        }
        if self.end.is_some_and(|end| record.timestamp > end) {
            return false;
        }
        if self.method.is_some_and(|method| record.request.method != method) {
            return false;
        }
        if let Some(environment) = non_empty(&self.environment) {
            if record.metadata.environment.as_deref() != Some(environment) {
                return false;
            }
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|tag| record.metadata.has_tag(tag)) {
            return false;
        }
        if let Some(query) = non_empty(&self.search) {
            return matches_query(record, &query.to_lowercase());
        }
        true
    }
}

/// Empty strings count as unset.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn matches_query(record: &OutcomeRecord, query_lower: &str) -> bool {
    if record.request.url.to_lowercase().contains(query_lower) {
        return true;
    }
    record
        .metadata
        .name
        .as_ref()
        .is_some_and(|name| name.to_lowercase().contains(query_lower))
}

/// Selects the records matching `filter`, keeping log order.
///
/// # Arguments
///
/// * `entries` - Records in newest-first order
/// * `filter` - Predicates to apply
///
/// # Returns
///
/// The matching records, newest first.
pub fn filter_history(entries: &[OutcomeRecord], filter: &HistoryFilter) -> Vec<OutcomeRecord> {
    entries
        .iter()
        .filter(|entry| filter.matches(entry))
        .cloned()
        .collect()
}
