//! Request draft data models.
//!
//! A [`RequestDraft`] is the user's edit buffer: the method, URL, header rows,
//! authorization and body exactly as typed. The executor treats it as read-only
//! input and derives the wire-level request from it.

use crate::auth::AuthSpec;
use serde::{Deserialize, Serialize};

/// HTTP request method.
///
/// Only the methods offered by the composer are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HttpMethod {
    /// HTTP GET method - retrieve a resource
    #[default]
    GET,
    /// HTTP POST method - submit data to create a resource
    POST,
    /// HTTP PUT method - replace a resource
    PUT,
    /// HTTP DELETE method - remove a resource
    DELETE,
    /// HTTP PATCH method - partially modify a resource
    PATCH,
}

impl HttpMethod {
    /// All methods in the order the composer presents them.
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::GET,
        HttpMethod::POST,
        HttpMethod::PUT,
        HttpMethod::DELETE,
        HttpMethod::PATCH,
    ];

    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
        }
    }

    /// Parses a method name, ignoring case.
    ///
    /// Returns `None` for anything outside the supported set.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            _ => None,
        }
    }

    /// Whether a request with this method transmits the draft body.
    ///
    /// Only POST, PUT and PATCH carry a body; GET and DELETE never do.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::POST | HttpMethod::PUT | HttpMethod::PATCH)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::parse(s).ok_or_else(|| format!("unsupported HTTP method: {}", s))
    }
}

/// A single header row from the header editor.
///
/// Keys are not required to be unique and rows with an empty key or value are
/// kept in the draft; they are skipped when the request is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether this row contributes to the resolved request.
    pub fn is_blank(&self) -> bool {
        self.key.is_empty() || self.value.is_empty()
    }
}

/// The user-authored description of a request at a point in time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestDraft {
    /// HTTP method (GET, POST, PUT, DELETE, PATCH).
    pub method: HttpMethod,

    /// Target URL, exactly as typed.
    pub url: String,

    /// Ordered header rows.
    pub headers: Vec<Header>,

    /// Authorization settings from the authorization editor.
    pub authorization: AuthSpec,

    /// Raw body text. Only transmitted for methods that carry a body.
    pub body: String,
}

impl RequestDraft {
    /// Creates a draft with no headers, no authorization and an empty body.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Default::default()
        }
    }

    /// Appends a header row.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(key, value));
        self
    }

    /// Sets the body text.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the authorization.
    pub fn with_authorization(mut self, authorization: AuthSpec) -> Self {
        self.authorization = authorization;
        self
    }

    /// Whether the URL is empty once surrounding whitespace is removed.
    ///
    /// Such a draft must not be sent.
    pub fn has_blank_url(&self) -> bool {
        self.url.trim().is_empty()
    }

    /// The body that would be transmitted, if any.
    pub fn transmitted_body(&self) -> Option<&str> {
        if self.method.carries_body() {
            Some(self.body.as_str())
        } else {
            None
        }
    }
}
