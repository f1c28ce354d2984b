//! Request authorization.
//!
//! The authorization editor produces an [`AuthSpec`]. At execution time it is
//! resolved into at most one derived `Authorization` header, which replaces any
//! user-supplied header of the same name.
//!
//! Only bearer tokens produce a header. The `basic` kind is part of the
//! persisted shape and round-trips through serialization, but it resolves to
//! no header.

pub mod bearer;

use crate::models::HeaderList;
use serde::{Deserialize, Serialize};

/// Canonical name of the derived header.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Authorization settings attached to a draft.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthSpec {
    /// No authorization.
    #[default]
    None,
    /// Bearer token authentication (RFC 6750).
    Bearer {
        #[serde(default)]
        token: String,
    },
    /// Username/password pair. Recognised but never sent.
    Basic {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },
}

impl AuthSpec {
    pub fn bearer(token: impl Into<String>) -> Self {
        AuthSpec::Bearer {
            token: token.into(),
        }
    }

    /// The kind name as it appears in persisted drafts.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthSpec::None => "none",
            AuthSpec::Bearer { .. } => "bearer",
            AuthSpec::Basic { .. } => "basic",
        }
    }

    /// Resolves the derived `Authorization` header value, if any.
    ///
    /// Bearer authorization with an empty token yields nothing.
    pub fn header_value(&self) -> Option<String> {
        match self {
            AuthSpec::Bearer { token } if !token.is_empty() => Some(bearer::bearer_token(token)),
            AuthSpec::Bearer { .. } | AuthSpec::None => None,
            AuthSpec::Basic { .. } => {
                log::debug!("basic authorization is not applied to outgoing requests");
                None
            }
        }
    }

    /// Recovers authorization from a previously sent header value.
    ///
    /// Only bearer headers are recognised.
    pub fn from_header_value(value: &str) -> Option<Self> {
        bearer::parse_bearer_token_header(value).map(AuthSpec::bearer)
    }
}

/// Applies the derived header to a resolved header map.
///
/// Any existing `Authorization` header (matched case-insensitively) is removed
/// first, so the map ends up with exactly one. Returns `true` if a header was
/// injected.
pub fn apply_authorization(headers: &mut HeaderList, auth: &AuthSpec) -> bool {
    match auth.header_value() {
        Some(value) => {
            headers.remove_ignore_case(AUTHORIZATION_HEADER);
            headers.insert(AUTHORIZATION_HEADER.to_string(), value);
            true
        }
        None => false,
    }
}
