//! HTTP request execution error types.
//!
//! These never escape the engine as `Err` values. Each one is folded into a
//! zero-status outcome whose body is [`RequestError::message`] and whose
//! error block carries [`RequestError::code`]. `Display` adds a prefix naming
//! the class of failure and is meant for logs.

use std::fmt;

/// Errors that can occur while executing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Connection, DNS or other network-level failure.
    NetworkError(String),

    /// The server could not be reached.
    ConnectError(String),

    /// Request took longer than the configured timeout.
    Timeout(String),

    /// The URL could not be parsed.
    InvalidUrl(String),

    /// Only HTTP and HTTPS are supported.
    UnsupportedProtocol(String),

    /// Certificate validation or handshake failure.
    TlsError(String),

    /// The response body could not be read or decoded.
    DecodeError(String),

    /// The transport refused to build the request (e.g. an invalid header).
    BuildError(String),
}

impl RequestError {
    /// Short machine-readable classification stored in the outcome's error block.
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::NetworkError(_) => "network",
            RequestError::ConnectError(_) => "connect",
            RequestError::Timeout(_) => "timeout",
            RequestError::InvalidUrl(_) => "invalid_url",
            RequestError::UnsupportedProtocol(_) => "unsupported_protocol",
            RequestError::TlsError(_) => "tls",
            RequestError::DecodeError(_) => "decode",
            RequestError::BuildError(_) => "build",
        }
    }

    /// The underlying failure message without the classification prefix.
    ///
    /// This is what an outcome shows as its body. It is empty when the
    /// transport gave no message.
    pub fn message(&self) -> String {
        match self {
            RequestError::NetworkError(msg)
            | RequestError::ConnectError(msg)
            | RequestError::Timeout(msg)
            | RequestError::InvalidUrl(msg)
            | RequestError::TlsError(msg)
            | RequestError::DecodeError(msg)
            | RequestError::BuildError(msg) => msg.trim().to_string(),
            RequestError::UnsupportedProtocol(_) => self.to_string(),
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            RequestError::ConnectError(msg) => write!(f, "Connection failed: {}", msg),
            RequestError::Timeout(msg) => write!(f, "Request timed out: {}", msg),
            RequestError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            RequestError::UnsupportedProtocol(scheme) => {
                write!(f, "Unsupported protocol: {}", scheme)
            }
            RequestError::TlsError(msg) => write!(f, "TLS/SSL error: {}", msg),
            RequestError::DecodeError(msg) => write!(f, "Failed to decode response: {}", msg),
            RequestError::BuildError(msg) => write!(f, "Request build error: {}", msg),
        }
    }
}

impl std::error::Error for RequestError {}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            RequestError::Timeout(message)
        } else if err.is_builder() {
            RequestError::BuildError(message)
        } else if err.is_decode() || err.is_body() {
            RequestError::DecodeError(message)
        } else if message.contains("certificate") || message.contains("TLS") || message.contains("SSL")
        {
            RequestError::TlsError(message)
        } else if err.is_connect() {
            RequestError::ConnectError(message)
        } else {
            RequestError::NetworkError(message)
        }
    }
}

impl From<url::ParseError> for RequestError {
    fn from(err: url::ParseError) -> Self {
        RequestError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        RequestError::DecodeError(err.to_string())
    }
}
