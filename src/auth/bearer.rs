//! Bearer token header formatting (RFC 6750).

const SCHEME_PREFIX: &str = "Bearer ";

/// Formats a token as an `Authorization` header value.
///
/// # Examples
///
/// ```
/// use rest_composer::auth::bearer::bearer_token;
///
/// assert_eq!(bearer_token("abc123xyz"), "Bearer abc123xyz");
/// ```
pub fn bearer_token(token: &str) -> String {
    format!("{}{}", SCHEME_PREFIX, token)
}

/// Extracts the token from a `Bearer <token>` header value.
///
/// The scheme name is matched exactly. Surrounding whitespace is ignored and an
/// empty token yields `None`.
///
/// # Examples
///
/// ```
/// use rest_composer::auth::bearer::parse_bearer_token_header;
///
/// assert_eq!(parse_bearer_token_header("Bearer abc"), Some("abc".to_string()));
/// assert_eq!(parse_bearer_token_header("Basic dXNlcjpwYXNz"), None);
/// ```
pub fn parse_bearer_token_header(header: &str) -> Option<String> {
    let token = header.trim().strip_prefix(SCHEME_PREFIX)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
