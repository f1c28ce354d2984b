//! Draft to wire-request resolution.
//!
//! Turns the user's edit buffer into the exact method, URL, headers and body
//! that go over the wire. Resolution is synchronous and never fails; URL
//! problems surface when the request is sent.

use super::error::RequestError;
use crate::auth::{apply_authorization, AuthSpec};
use crate::history::RecordedRequest;
use crate::models::{Header, HeaderList, HttpMethod, RequestDraft};
use url::Url;

/// A request ready to be handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    /// The draft URL with surrounding whitespace removed.
    pub url: String,
    pub headers: HeaderList,
    /// Present only for methods that carry a body.
    pub body: Option<String>,
}

impl ResolvedRequest {
    /// Resolves a draft.
    ///
    /// Header rows with an empty key or value are skipped, a repeated key keeps
    /// its last value, and the authorization header replaces any user-supplied
    /// one. GET and DELETE drop the body.
    pub fn from_draft(draft: &RequestDraft) -> Self {
        Self {
            method: draft.method,
            url: draft.url.trim().to_string(),
            headers: resolve_headers(&draft.headers, &draft.authorization),
            body: draft.transmitted_body().map(str::to_string),
        }
    }

    /// Parses the URL, accepting only `http` and `https`.
    pub fn parsed_url(&self) -> Result<Url, RequestError> {
        let url = Url::parse(&self.url)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(RequestError::UnsupportedProtocol(other.to_string())),
        }
    }

    pub fn reqwest_method(&self) -> reqwest::Method {
        match self.method {
            HttpMethod::GET => reqwest::Method::GET,
            HttpMethod::POST => reqwest::Method::POST,
            HttpMethod::PUT => reqwest::Method::PUT,
            HttpMethod::DELETE => reqwest::Method::DELETE,
            HttpMethod::PATCH => reqwest::Method::PATCH,
        }
    }

    /// The request as it is written to history.
    pub fn to_recorded(&self) -> RecordedRequest {
        RecordedRequest {
            url: self.url.clone(),
            method: self.method,
            headers: self.headers.clone(),
            body: self.body.clone(),
            query: query_parameters(&self.url),
        }
    }
}

/// Builds the wire header map from draft rows and authorization.
pub fn resolve_headers(rows: &[Header], authorization: &AuthSpec) -> HeaderList {
    let mut headers: HeaderList = rows
        .iter()
        .filter(|row| !row.is_blank())
        .map(|row| (row.key.as_str(), row.value.as_str()))
        .collect();
    apply_authorization(&mut headers, authorization);
    headers
}

fn query_parameters(url: &str) -> Option<HeaderList> {
    let url = Url::parse(url).ok()?;
    let params: HeaderList = url.query_pairs().into_owned().collect();
    if params.is_empty() {
        None
    } else {
        Some(params)
    }
}
