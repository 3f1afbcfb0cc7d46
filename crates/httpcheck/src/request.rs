//! The request a check will send.

use std::net::SocketAddr;

use reqwest::Method;
use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::CheckError;

/// Request under construction for the next check.
///
/// The target is a path (plus optional query) that is resolved against the
/// transient server's address when the check runs.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: Method,
    target: String,
    headers: HeaderMap,
    cookies: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    url: Option<Url>,
}

impl PendingRequest {
    /// Create a request for `method` and `target`.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        Self {
            method,
            target: normalize_target(target),
            headers: HeaderMap::new(),
            cookies: Vec::new(),
            body: None,
            url: None,
        }
    }

    /// Adopt a caller-built request. Only the path and query of its URI are
    /// kept; scheme and authority always point at the transient server.
    #[must_use]
    pub fn from_http(request: axum::http::Request<Vec<u8>>) -> Self {
        let (parts, body) = request.into_parts();
        let target = parts
            .uri
            .path_and_query()
            .map_or("/", axum::http::uri::PathAndQuery::as_str);

        Self {
            method: parts.method,
            target: normalize_target(target),
            headers: parts.headers,
            cookies: Vec::new(),
            body: (!body.is_empty()).then_some(body),
            url: None,
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Path and query the request targets.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Headers set so far.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of header `name`, if set and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Cookies added explicitly, in insertion order.
    #[must_use]
    pub fn cookies(&self) -> &[(String, String)] {
        &self.cookies
    }

    /// Value of the first explicit cookie named `name`.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Body bytes, if a body was set.
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Length the `Content-Length` header will carry.
    #[must_use]
    pub fn content_length(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }

    /// URL the request was last sent to.
    #[must_use]
    pub const fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Set (overwrite) a header.
    pub(crate) fn set_header(&mut self, name: &str, value: &str) -> Result<(), CheckError> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| CheckError::InvalidHeaderName(name.to_string()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| CheckError::InvalidHeaderValue {
                name: name.to_string(),
                value: value.to_string(),
            })?;
        self.headers.insert(header_name, header_value);
        Ok(())
    }

    pub(crate) fn add_cookie(&mut self, name: &str, value: &str) {
        self.cookies.push((name.to_string(), value.to_string()));
    }

    pub(crate) fn set_body(&mut self, body: Vec<u8>) {
        self.body = Some(body);
    }

    /// Resolve the target against a running server.
    pub(crate) fn resolve(&mut self, addr: SocketAddr) -> Result<Url, CheckError> {
        let raw = format!("http://{addr}{}", self.target);
        let url = Url::parse(&raw).map_err(|e| CheckError::InvalidUrl(format!("{e}: {raw}")))?;
        self.url = Some(url.clone());
        Ok(url)
    }

    /// Headers to send, with the jar's cookies and the explicit cookies
    /// merged into a single `Cookie` header.
    pub(crate) fn outgoing_headers(
        &self,
        jar_cookies: Option<String>,
    ) -> Result<HeaderMap, CheckError> {
        let mut headers = self.headers.clone();

        let mut pairs: Vec<String> = Vec::new();
        pairs.extend(jar_cookies);
        if let Some(existing) = headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
            pairs.push(existing.to_string());
        }
        pairs.extend(self.cookies.iter().map(|(n, v)| format!("{n}={v}")));

        if !pairs.is_empty() {
            let value = pairs.join("; ");
            let header_value =
                HeaderValue::from_str(&value).map_err(|_| CheckError::InvalidHeaderValue {
                    name: COOKIE.to_string(),
                    value,
                })?;
            headers.insert(COOKIE, header_value);
        }

        Ok(headers)
    }
}

fn normalize_target(target: &str) -> String {
    if target.starts_with('/') {
        target.to_string()
    } else {
        format!("/{target}")
    }
}
