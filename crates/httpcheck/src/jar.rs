//! Session cookie store.
//!
//! The reqwest client holds one `SessionJar` for its whole life. Each check
//! swaps the jar's contents for a fresh [`CookieJar`] seeded only with the
//! persisted cookies, so everything else from the previous response is
//! dropped in one step.

use std::collections::BTreeSet;

use httpcheck_domain::CookieJar;
use parking_lot::RwLock;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use url::Url;

/// Cookie store shared between the session and its HTTP client.
#[derive(Debug, Default)]
pub struct SessionJar {
    inner: RwLock<CookieJar>,
}

impl SessionJar {
    /// Replace the stored cookies with `jar`.
    pub fn replace(&self, jar: CookieJar) {
        *self.inner.write() = jar;
    }

    /// Copy of the current cookies.
    #[must_use]
    pub fn snapshot(&self) -> CookieJar {
        self.inner.read().clone()
    }

    /// Start a new check against `url`: keep only cookies whose names are in
    /// `persisted`, re-scoped to `url`.
    pub fn rotate(&self, persisted: &BTreeSet<String>, url: &Url) {
        let mut fresh = CookieJar::new();
        {
            let current = self.inner.read();
            for name in persisted {
                if let Some(cookie) = current.find(url, name) {
                    fresh.add(cookie.clone().scoped_to(url));
                }
            }
        }
        self.replace(fresh);
    }

    /// Whether a cookie with this exact name and value is visible to `url`.
    #[must_use]
    pub fn contains(&self, url: &Url, name: &str, value: &str) -> bool {
        self.inner
            .read()
            .get_for_url(url)
            .iter()
            .any(|c| c.name == name && c.value == value)
    }

    /// `Cookie` header value for `url`, if any cookie applies.
    #[must_use]
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        self.inner.read().cookie_header(url)
    }
}

impl CookieStore for SessionJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let values: Vec<&str> = cookie_headers.filter_map(|h| h.to_str().ok()).collect();
        self.inner.write().process_set_cookies(values, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.cookie_header(url)
            .and_then(|header| HeaderValue::from_str(&header).ok())
    }
}
