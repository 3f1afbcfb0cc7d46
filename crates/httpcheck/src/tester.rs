//! Fluent request builder and assertions.
//!
//! A [`Tester`] borrows its [`Checker`] for one check. Builder methods
//! mutate the pending request, [`Tester::check`] dispatches it, and the
//! assertion methods inspect the captured response. Every assertion has a
//! soft form (`has_*`, `contains_*`) that records the failure and continues,
//! and a `must_*` form that aborts the test.

use std::sync::Arc;

use httpcheck_domain::{
    FormPart, JsonComparison, Payload, basic_auth_value, bearer_auth_value, build_multipart,
    compare_json, encode_json, encode_xml,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use serde::Serialize;

use crate::checker::Checker;
use crate::error::CheckError;
use crate::request::PendingRequest;
use crate::reporter::{PanicReporter, Reporter};
use crate::response::CapturedResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Soft,
    Fatal,
}

/// Chain handle for one request and its response.
pub struct Tester<'c> {
    checker: &'c mut Checker,
    reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for Tester<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tester")
            .field("checker", &self.checker)
            .field("failed", &self.reporter.failed())
            .finish()
    }
}

impl<'c> Tester<'c> {
    pub(crate) fn new(checker: &'c mut Checker) -> Self {
        Self {
            checker,
            reporter: Arc::new(PanicReporter::new()),
        }
    }

    /// Send failures to `reporter` instead of the default [`PanicReporter`].
    pub fn report_to(&mut self, reporter: Arc<dyn Reporter>) -> &mut Self {
        self.reporter = reporter;
        self
    }

    /// The session this tester belongs to.
    #[must_use]
    pub fn checker(&self) -> &Checker {
        self.checker
    }

    /// Keep cookie `name` across checks.
    pub fn persist_cookie(&mut self, name: &str) -> &mut Self {
        self.checker.persist_cookie(name);
        self
    }

    /// Stop keeping cookie `name` across checks.
    pub fn unpersist_cookie(&mut self, name: &str) -> &mut Self {
        self.checker.unpersist_cookie(name);
        self
    }

    // Request builder

    /// Set header `key`, replacing any previous value.
    pub fn with_header(&mut self, key: &str, value: &str) -> &mut Self {
        let result = self.pending().set_header(key, value);
        self.ensure(result);
        self
    }

    /// Set every header in `headers`. An empty iterator is a no-op.
    pub fn with_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in headers {
            self.with_header(key.as_ref(), value.as_ref());
        }
        self
    }

    /// Override the `Host` header.
    pub fn with_host_header(&mut self, value: &str) -> &mut Self {
        self.with_header(HOST.as_str(), value)
    }

    /// Add a cookie to the request. Repeated names are all sent.
    pub fn with_cookie(&mut self, key: &str, value: &str) -> &mut Self {
        self.pending().add_cookie(key, value);
        self
    }

    /// Use `body` as the request body.
    pub fn with_body(&mut self, body: &[u8]) -> &mut Self {
        self.pending().set_body(body.to_vec());
        self
    }

    /// Use `body` as the request body.
    pub fn with_string(&mut self, body: &str) -> &mut Self {
        self.with_body(body.as_bytes())
    }

    /// Use `value` encoded as JSON as the request body.
    pub fn with_json<T: Serialize + ?Sized>(&mut self, value: &T) -> &mut Self {
        let encoded = self.ensure(encode_json(value).map_err(CheckError::from));
        self.pending().set_body(encoded);
        self
    }

    /// Use `value` encoded as XML as the request body.
    pub fn with_xml<T: Serialize + ?Sized>(&mut self, value: &T) -> &mut Self {
        let encoded = self.ensure(encode_xml(value).map_err(CheckError::from));
        self.pending().set_body(encoded);
        self
    }

    /// Use a multipart form built from `parts` as the request body.
    pub fn with_multipart(&mut self, parts: &[&dyn FormPart]) -> &mut Self {
        let multipart = self.ensure(build_multipart(parts).map_err(CheckError::from));
        self.with_header(CONTENT_TYPE.as_str(), &multipart.content_type);
        self.pending().set_body(multipart.body);
        self
    }

    /// Set `Authorization` to HTTP basic credentials.
    pub fn with_basic_auth(&mut self, user: &str, password: &str) -> &mut Self {
        self.with_header(AUTHORIZATION.as_str(), &basic_auth_value(user, password))
    }

    /// Set `Authorization` to `Bearer: <token>`.
    pub fn with_bearer_auth(&mut self, token: &str) -> &mut Self {
        self.with_header(AUTHORIZATION.as_str(), &bearer_auth_value(token))
    }

    // Dispatch

    /// Send the pending request and capture the response.
    ///
    /// Transport errors are fatal.
    pub async fn check(&mut self) -> &mut Self {
        let result = self.checker.dispatch().await;
        self.ensure(result);
        self
    }

    /// Call `callback` with the captured response.
    pub fn cb<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce(&CapturedResponse),
    {
        callback(self.captured());
        self
    }

    // Status

    /// Status code equals `status`.
    pub fn has_status(&mut self, status: u16) -> &mut Self {
        self.assert_status(status, Severity::Soft)
    }

    /// Status code equals `status`, or abort.
    pub fn must_have_status(&mut self, status: u16) -> &mut Self {
        self.assert_status(status, Severity::Fatal)
    }

    // Headers

    /// Header `key` is present with exactly `expected`.
    pub fn has_header(&mut self, key: &str, expected: &str) -> &mut Self {
        self.assert_header(key, expected, Severity::Soft)
    }

    /// Header `key` is present with exactly `expected`, or abort.
    pub fn must_have_header(&mut self, key: &str, expected: &str) -> &mut Self {
        self.assert_header(key, expected, Severity::Fatal)
    }

    /// Every header in `headers` is present with exactly its value.
    pub fn has_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in headers {
            self.assert_header(key.as_ref(), value.as_ref(), Severity::Soft);
        }
        self
    }

    /// Every header in `headers` is present with exactly its value, or abort
    /// at the first mismatch.
    pub fn must_have_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in headers {
            self.assert_header(key.as_ref(), value.as_ref(), Severity::Fatal);
        }
        self
    }

    // Cookies

    /// The session jar holds cookie `key` with `expected` for the request URL.
    pub fn has_cookie(&mut self, key: &str, expected: &str) -> &mut Self {
        self.assert_cookie(key, expected, Severity::Soft)
    }

    /// The session jar holds cookie `key` with `expected`, or abort.
    pub fn must_have_cookie(&mut self, key: &str, expected: &str) -> &mut Self {
        self.assert_cookie(key, expected, Severity::Fatal)
    }

    // Body

    /// Body equals `expected` byte for byte.
    pub fn has_body(&mut self, expected: &[u8]) -> &mut Self {
        self.assert_body(expected, Severity::Soft)
    }

    /// Body equals `expected` byte for byte, or abort.
    pub fn must_have_body(&mut self, expected: &[u8]) -> &mut Self {
        self.assert_body(expected, Severity::Fatal)
    }

    /// Body contains `segment`.
    pub fn contains_body(&mut self, segment: &[u8]) -> &mut Self {
        self.assert_contains(segment, true, Severity::Soft)
    }

    /// Body contains `segment`, or abort.
    pub fn must_contain_body(&mut self, segment: &[u8]) -> &mut Self {
        self.assert_contains(segment, true, Severity::Fatal)
    }

    /// Body does not contain `segment`.
    pub fn not_contains_body(&mut self, segment: &[u8]) -> &mut Self {
        self.assert_contains(segment, false, Severity::Soft)
    }

    /// Body does not contain `segment`, or abort.
    pub fn must_not_contain_body(&mut self, segment: &[u8]) -> &mut Self {
        self.assert_contains(segment, false, Severity::Fatal)
    }

    /// Body equals `expected`.
    pub fn has_string(&mut self, expected: &str) -> &mut Self {
        self.assert_body(expected.as_bytes(), Severity::Soft)
    }

    /// Body equals `expected`, or abort.
    pub fn must_have_string(&mut self, expected: &str) -> &mut Self {
        self.assert_body(expected.as_bytes(), Severity::Fatal)
    }

    /// Body contains `substr`.
    pub fn contains_string(&mut self, substr: &str) -> &mut Self {
        self.assert_contains(substr.as_bytes(), true, Severity::Soft)
    }

    /// Body contains `substr`, or abort.
    pub fn must_contain_string(&mut self, substr: &str) -> &mut Self {
        self.assert_contains(substr.as_bytes(), true, Severity::Fatal)
    }

    /// Body does not contain `substr`.
    pub fn not_contains_string(&mut self, substr: &str) -> &mut Self {
        self.assert_contains(substr.as_bytes(), false, Severity::Soft)
    }

    /// Body does not contain `substr`, or abort.
    pub fn must_not_contain_string(&mut self, substr: &str) -> &mut Self {
        self.assert_contains(substr.as_bytes(), false, Severity::Fatal)
    }

    // Encoded bodies

    /// Body is JSON equal to `expected`, ignoring key order and whitespace.
    ///
    /// Accepts a reference to any serializable value, or a literal
    /// [`Payload::text`] / [`Payload::bytes`].
    pub fn has_json<'e, T>(&mut self, expected: impl Into<Payload<'e, T>>) -> &mut Self
    where
        T: Serialize + ?Sized + 'e,
    {
        self.assert_json(&expected.into(), Severity::Soft)
    }

    /// Body is JSON equal to `expected`, or abort.
    pub fn must_have_json<'e, T>(&mut self, expected: impl Into<Payload<'e, T>>) -> &mut Self
    where
        T: Serialize + ?Sized + 'e,
    {
        self.assert_json(&expected.into(), Severity::Fatal)
    }

    /// Body is exactly the XML encoding of `expected`.
    pub fn has_xml<'e, T>(&mut self, expected: impl Into<Payload<'e, T>>) -> &mut Self
    where
        T: Serialize + ?Sized + 'e,
    {
        self.assert_xml(&expected.into(), Severity::Soft)
    }

    /// Body is exactly the XML encoding of `expected`, or abort.
    pub fn must_have_xml<'e, T>(&mut self, expected: impl Into<Payload<'e, T>>) -> &mut Self
    where
        T: Serialize + ?Sized + 'e,
    {
        self.assert_xml(&expected.into(), Severity::Fatal)
    }

    // Internals

    fn pending(&mut self) -> &mut PendingRequest {
        match self.checker.request_mut() {
            Some(request) => request,
            None => self
                .reporter
                .fatal("no request to configure, call test() first"),
        }
    }

    fn captured(&self) -> &CapturedResponse {
        match self.checker.response() {
            Some(response) => response,
            None => self
                .reporter
                .fatal("no response captured, call check() first"),
        }
    }

    /// Unwrap a configuration or transport result, failing the test on error.
    fn ensure<T>(&self, result: Result<T, CheckError>) -> T {
        match result {
            Ok(value) => value,
            Err(e) => self.reporter.fatal(&e.to_string()),
        }
    }

    fn report(&mut self, failure: Option<String>, severity: Severity) -> &mut Self {
        if let Some(message) = failure {
            match severity {
                Severity::Soft => self.reporter.error(&message),
                Severity::Fatal => self.reporter.fatal(&message),
            }
        }
        self
    }

    fn assert_status(&mut self, expected: u16, severity: Severity) -> &mut Self {
        let actual = self.captured().status().as_u16();
        let failure = (actual != expected).then(|| format!("expected status {expected}, got {actual}"));
        self.report(failure, severity)
    }

    fn assert_header(&mut self, key: &str, expected: &str, severity: Severity) -> &mut Self {
        let failure = match self.captured().header(key) {
            Some(actual) if actual == expected => None,
            Some(actual) => Some(format!(
                "expected header {key}: {expected:?}, got {actual:?}"
            )),
            None => Some(format!("header {key} not found, expected {expected:?}")),
        };
        self.report(failure, severity)
    }

    fn assert_cookie(&mut self, key: &str, expected: &str, severity: Severity) -> &mut Self {
        let response_url = self.captured().url().clone();
        let url = self.checker.url().cloned().unwrap_or(response_url);
        let found = self.checker.jar().contains(&url, key, expected);
        let failure = (!found).then(|| format!("cookie not found, expected {key}={expected}"));
        self.report(failure, severity)
    }

    fn assert_body(&mut self, expected: &[u8], severity: Severity) -> &mut Self {
        let actual = self.captured().body();
        let failure = (actual != expected).then(|| {
            format!(
                "expected body {:?}, got {:?}",
                String::from_utf8_lossy(expected),
                String::from_utf8_lossy(actual)
            )
        });
        self.report(failure, severity)
    }

    fn assert_contains(&mut self, segment: &[u8], present: bool, severity: Severity) -> &mut Self {
        let actual = self.captured().body();
        let failure = (contains_bytes(actual, segment) != present).then(|| {
            let verb = if present { "does not contain" } else { "contains" };
            format!(
                "body {:?} {verb} {:?}",
                String::from_utf8_lossy(actual),
                String::from_utf8_lossy(segment)
            )
        });
        self.report(failure, severity)
    }

    fn assert_json<T>(&mut self, expected: &Payload<'_, T>, severity: Severity) -> &mut Self
    where
        T: Serialize + ?Sized,
    {
        let expected = self.ensure(expected.to_json().map_err(CheckError::from));
        let actual = self.captured().body();
        let failure = match compare_json(&expected, actual) {
            JsonComparison::Equal => None,
            JsonComparison::EmptyBody => Some("response body is empty".to_string()),
            JsonComparison::InvalidExpected(e) => Some(format!(
                "expected value is not valid JSON ({e}): {}",
                String::from_utf8_lossy(&expected)
            )),
            JsonComparison::InvalidActual(e) => Some(format!(
                "response body is not valid JSON ({e}): {}",
                String::from_utf8_lossy(actual)
            )),
            JsonComparison::Different => Some(format!(
                "expected JSON {}, got {}",
                String::from_utf8_lossy(&expected),
                String::from_utf8_lossy(actual)
            )),
        };
        self.report(failure, severity)
    }

    fn assert_xml<T>(&mut self, expected: &Payload<'_, T>, severity: Severity) -> &mut Self
    where
        T: Serialize + ?Sized,
    {
        let expected = self.ensure(expected.to_xml().map_err(CheckError::from));
        let actual = self.captured().body();
        let failure = (actual != expected.as_slice()).then(|| {
            format!(
                "expected XML {}, got {}",
                String::from_utf8_lossy(&expected),
                String::from_utf8_lossy(actual)
            )
        });
        self.report(failure, severity)
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_bytes() {
        assert!(contains_bytes(b"hello world", b"lo wo"));
        assert!(contains_bytes(b"hello", b""));
        assert!(contains_bytes(b"", b""));
        assert!(!contains_bytes(b"hello", b"world"));
        assert!(!contains_bytes(b"hi", b"hello"));
    }
}
