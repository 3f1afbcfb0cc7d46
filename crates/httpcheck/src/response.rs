//! The response captured by the last check.

use std::borrow::Cow;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use url::Url;

/// Response received by the last check, with its body fully read.
#[derive(Debug, Clone)]
pub struct CapturedResponse {
    status: StatusCode,
    headers: HeaderMap,
    url: Url,
    body: Vec<u8>,
    elapsed: Duration,
}

impl CapturedResponse {
    pub(crate) const fn new(
        status: StatusCode,
        headers: HeaderMap,
        url: Url,
        body: Vec<u8>,
        elapsed: Duration,
    ) -> Self {
        Self {
            status,
            headers,
            url,
            body,
            elapsed,
        }
    }

    /// Status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of header `name`, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Final URL, after any followed redirects.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Time from sending the request to reading the last body byte.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::header::{CONTENT_TYPE, HeaderValue};
    use serde::Deserialize;

    fn response(body: &[u8]) -> CapturedResponse {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        CapturedResponse::new(
            StatusCode::OK,
            headers,
            Url::parse("http://127.0.0.1:1/json").unwrap(),
            body.to_vec(),
            Duration::from_millis(3),
        )
    }

    #[test]
    fn test_accessors() {
        let response = response(b"hello world");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("missing"), None);
        assert_eq!(response.text(), "hello world");
        assert_eq!(response.url().path(), "/json");
    }

    #[test]
    fn test_json() {
        #[derive(Deserialize)]
        struct Person {
            #[serde(rename = "Name")]
            name: String,
        }

        let response = response(br#"{"Name":"Some","Age":30}"#);
        let person: Person = response.json().unwrap();
        assert_eq!(person.name, "Some");
        assert!(response.json::<Vec<u8>>().is_err());
    }
}
