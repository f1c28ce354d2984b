//! Ordered string-to-string header map.
//!
//! A thin wrapper over [`IndexMap`]: first-insertion order is kept and a later
//! insert for the same key replaces the value in place. Serializes as a plain
//! JSON object so persisted records read like `{"content-type": "application/json"}`.
//!
//! Keys compare exactly. HTTP header names are case-insensitive, so the
//! `*_ignore_case` helpers are what header logic should use.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderList(IndexMap<String, String>);

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every header whose name matches `name` case-insensitively.
    pub fn remove_ignore_case(&mut self, name: &str) {
        self.0.retain(|k, _| !k.eq_ignore_ascii_case(name));
    }

    /// Case-insensitive lookup, returning the first match.
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Number of headers whose name matches `name` case-insensitively.
    pub fn count_ignore_case(&self, name: &str) -> usize {
        self.0
            .keys()
            .filter(|k| k.eq_ignore_ascii_case(name))
            .count()
    }
}

impl Deref for HeaderList {
    type Target = IndexMap<String, String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for HeaderList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<IndexMap<String, String>> for HeaderList {
    fn from(map: IndexMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderList {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for HeaderList {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
