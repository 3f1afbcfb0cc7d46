//! Cookie management types.
//!
//! The jar here backs the session cookie store: it receives `Set-Cookie`
//! headers from captured responses and renders the `Cookie` header for the
//! next request.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A single HTTP cookie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain the cookie belongs to.
    pub domain: String,
    /// Path the cookie applies to.
    #[serde(default = "default_path")]
    pub path: String,
    /// Expiration time (None for session cookies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    /// HttpOnly flag.
    #[serde(default)]
    pub http_only: bool,
    /// Secure flag.
    #[serde(default)]
    pub secure: bool,
    /// SameSite attribute.
    #[serde(default)]
    pub same_site: SameSite,
}

fn default_path() -> String {
    "/".to_string()
}

impl Cookie {
    /// Create a new cookie.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: default_path(),
            expires: None,
            http_only: false,
            secure: false,
            same_site: SameSite::default(),
        }
    }

    /// Re-scope the cookie to the host of `url`.
    #[must_use]
    pub fn scoped_to(mut self, url: &Url) -> Self {
        if let Some(host) = url.host_str() {
            self.domain = host.to_lowercase();
        }
        self
    }

    /// Check if the cookie is expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|exp| exp < Utc::now())
    }

    /// Check if the cookie applies to a given URL.
    #[must_use]
    pub fn applies_to(&self, url: &Url) -> bool {
        if self.secure && url.scheme() != "https" {
            return false;
        }

        let Some(host) = url.host_str() else {
            return false;
        };
        if !domain_matches(&self.domain, host) {
            return false;
        }

        path_matches(&self.path, url.path())
    }

    /// Format for Cookie header.
    #[must_use]
    pub fn to_cookie_header(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Parse a Set-Cookie header received from `origin`.
    ///
    /// Without `Domain` or `Path` attributes the cookie is scoped to the
    /// origin host and its default path (RFC 6265 section 5.1.4).
    #[must_use]
    pub fn from_set_cookie(header: &str, origin: &Url) -> Option<Self> {
        let mut parts = header.split(';');

        // First part is name=value
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let host = origin.host_str().unwrap_or_default().to_lowercase();
        let mut cookie = Self::new(name, value.trim().trim_matches('"'), host);
        cookie.path = request_default_path(origin.path());
        let mut max_age = None;

        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let val = val.trim();
                match attr.trim().to_lowercase().as_str() {
                    "domain" if !val.is_empty() => {
                        cookie.domain = val.trim_start_matches('.').to_lowercase();
                    }
                    "path" if val.starts_with('/') => cookie.path = val.to_string(),
                    "expires" => {
                        if let Ok(exp) = DateTime::parse_from_rfc2822(val) {
                            cookie.expires = Some(exp.with_timezone(&Utc));
                        }
                    }
                    "max-age" => max_age = val.parse::<i64>().ok(),
                    "samesite" => {
                        cookie.same_site = match val.to_lowercase().as_str() {
                            "strict" => SameSite::Strict,
                            "lax" => SameSite::Lax,
                            _ => SameSite::None,
                        };
                    }
                    _ => {}
                }
            } else {
                match part.to_lowercase().as_str() {
                    "httponly" => cookie.http_only = true,
                    "secure" => cookie.secure = true,
                    _ => {}
                }
            }
        }

        // Max-Age takes precedence over Expires. A lifetime past the
        // representable range never expires.
        if let Some(secs) = max_age {
            cookie.expires = if secs <= 0 {
                Some(DateTime::<Utc>::MIN_UTC)
            } else {
                TimeDelta::try_seconds(secs).and_then(|d| Utc::now().checked_add_signed(d))
            };
        }

        Some(cookie)
    }
}

/// SameSite attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Cookies are sent with all requests.
    #[default]
    None,
    /// Cookies are sent with top-level navigations and GET from third-party sites.
    Lax,
    /// Cookies are only sent in first-party context.
    Strict,
}

/// Cookie jar keyed by domain.
///
/// Ports are ignored when matching, so a cookie set by one transient
/// listener stays visible to the next one on the same loopback host.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CookieJar {
    #[serde(default)]
    cookies: HashMap<String, Vec<Cookie>>,
}

impl CookieJar {
    /// Create a new empty cookie jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie to the jar.
    ///
    /// An expired cookie removes any stored cookie with the same name and
    /// path, which is how servers delete cookies.
    pub fn add(&mut self, cookie: Cookie) {
        let cookies = self.cookies.entry(cookie.domain.clone()).or_default();
        cookies.retain(|c| c.name != cookie.name || c.path != cookie.path);

        if !cookie.is_expired() {
            cookies.push(cookie);
        }
    }

    /// Get all cookies that would be sent to `url`.
    #[must_use]
    pub fn get_for_url(&self, url: &Url) -> Vec<&Cookie> {
        self.cookies
            .values()
            .flatten()
            .filter(|c| !c.is_expired() && c.applies_to(url))
            .collect()
    }

    /// Find the first cookie named `name` that would be sent to `url`.
    #[must_use]
    pub fn find(&self, url: &Url, name: &str) -> Option<&Cookie> {
        self.get_for_url(url).into_iter().find(|c| c.name == name)
    }

    /// Get the total number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.values().map(Vec::len).sum()
    }

    /// Check if the jar is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build the Cookie header value for a URL.
    #[must_use]
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.get_for_url(url);
        if cookies.is_empty() {
            return None;
        }

        let header_value: Vec<String> = cookies.iter().map(|c| c.to_cookie_header()).collect();
        Some(header_value.join("; "))
    }

    /// Store every parsable `Set-Cookie` value received from `url`.
    pub fn process_set_cookies<'a>(&mut self, values: impl IntoIterator<Item = &'a str>, url: &Url) {
        for value in values {
            if let Some(cookie) = Cookie::from_set_cookie(value, url) {
                self.add(cookie);
            }
        }
    }
}

/// Directory of the request path: `/auth/login` gives `/auth`, and a path
/// with a single `/` gives `/`.
fn request_default_path(request_path: &str) -> String {
    match request_path.rfind('/') {
        Some(idx) if idx > 0 && request_path.starts_with('/') => request_path[..idx].to_string(),
        _ => default_path(),
    }
}

/// Check if a cookie domain matches a request host.
fn domain_matches(cookie_domain: &str, request_host: &str) -> bool {
    let cookie_domain = cookie_domain.to_lowercase();
    let request_host = request_host.to_lowercase();

    cookie_domain == request_host || request_host.ends_with(&format!(".{cookie_domain}"))
}

/// RFC 6265 path matching: `/api` covers `/api` and `/api/users` but not `/apix`.
fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if cookie_path == request_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}
