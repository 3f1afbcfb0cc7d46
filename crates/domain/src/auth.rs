//! `Authorization` header values.

use base64::Engine;

/// Prefix written before bearer tokens.
///
/// Kept as `"Bearer: "` (with a colon) for compatibility with existing
/// handlers that match on it; RFC 6750 uses `"Bearer "`.
pub const BEARER_PREFIX: &str = "Bearer: ";

/// Build a Basic auth header value (base64 of `user:pass`).
#[must_use]
pub fn basic_auth_value(username: &str, password: &str) -> String {
    let credentials = format!("{username}:{password}");
    let encoded = base64::engine::general_purpose::STANDARD.encode(credentials.as_bytes());
    format!("Basic {encoded}")
}

/// Build a bearer auth header value.
#[must_use]
pub fn bearer_auth_value(token: &str) -> String {
    format!("{BEARER_PREFIX}{token}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_value() {
        // "alice:secret" base64 encoded is "YWxpY2U6c2VjcmV0"
        assert_eq!(basic_auth_value("alice", "secret"), "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn test_bearer_auth_value_keeps_colon() {
        assert_eq!(bearer_auth_value("abc-123"), "Bearer: abc-123");
    }
}
