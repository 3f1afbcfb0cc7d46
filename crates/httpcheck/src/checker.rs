//! The checker session.
//!
//! A [`Checker`] owns one router, one HTTP client and one cookie jar for the
//! whole test. Each [`Tester`] it hands out configures a request, runs one
//! check and asserts on the captured response.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use httpcheck_domain::{CheckerConfig, CookieJar, RedirectMode};
use reqwest::redirect::Policy;
use reqwest::{Client, Method};
use url::Url;

use crate::client::{build_client, map_error};
use crate::error::{CheckError, CheckResult};
use crate::jar::SessionJar;
use crate::request::PendingRequest;
use crate::response::CapturedResponse;
use crate::server::TransientServer;
use crate::tester::Tester;

/// Test session around one router.
#[derive(Debug)]
pub struct Checker {
    client: Client,
    jar: Arc<SessionJar>,
    server: TransientServer,
    config: CheckerConfig,
    persisted: BTreeSet<String>,
    request: Option<PendingRequest>,
    response: Option<CapturedResponse>,
}

impl Checker {
    /// Create a session with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(router: Router) -> CheckResult<Self> {
        Self::builder(router).build()
    }

    /// Start configuring a session.
    #[must_use]
    pub fn builder(router: Router) -> CheckerBuilder {
        CheckerBuilder::new(router)
    }

    /// Options this session was built with.
    #[must_use]
    pub const fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Keep cookie `name` across checks. Persisting a name twice is a no-op.
    pub fn persist_cookie(&mut self, name: &str) {
        self.persisted.insert(name.to_string());
    }

    /// Stop keeping cookie `name`. Unknown names are ignored.
    pub fn unpersist_cookie(&mut self, name: &str) {
        self.persisted.remove(name);
    }

    /// Names of persisted cookies, sorted.
    pub fn persisted_cookies(&self) -> impl Iterator<Item = &str> {
        self.persisted.iter().map(String::as_str)
    }

    /// Prepare a request for `method` and `path`.
    ///
    /// Replaces any pending request and discards the last captured response.
    pub fn test(&mut self, method: Method, path: &str) -> Tester<'_> {
        self.install(PendingRequest::new(method, path))
    }

    /// Prepare a caller-built request.
    ///
    /// Only the path and query of its URI are used; the request is always
    /// sent to the transient server.
    pub fn test_request(&mut self, request: axum::http::Request<Vec<u8>>) -> Tester<'_> {
        self.install(PendingRequest::from_http(request))
    }

    /// The pending request, if one was prepared.
    #[must_use]
    pub const fn request(&self) -> Option<&PendingRequest> {
        self.request.as_ref()
    }

    /// The response captured by the last check.
    #[must_use]
    pub const fn response(&self) -> Option<&CapturedResponse> {
        self.response.as_ref()
    }

    /// URL the last check was sent to.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.request.as_ref().and_then(PendingRequest::url)
    }

    /// Copy of the session's cookies.
    #[must_use]
    pub fn cookies(&self) -> CookieJar {
        self.jar.snapshot()
    }

    fn install(&mut self, request: PendingRequest) -> Tester<'_> {
        self.request = Some(request);
        self.response = None;
        Tester::new(self)
    }

    pub(crate) const fn request_mut(&mut self) -> Option<&mut PendingRequest> {
        self.request.as_mut()
    }

    pub(crate) fn jar(&self) -> &SessionJar {
        &self.jar
    }

    /// Run one check: start the server, send the pending request, capture
    /// the response and stop the server.
    ///
    /// The server is stopped whether or not the request succeeded.
    pub(crate) async fn dispatch(&mut self) -> CheckResult<()> {
        if self.request.is_none() {
            return Err(CheckError::Usage("no request to check, call test() first"));
        }

        let addr = self.server.start().await?;
        let result = self.send(addr).await;
        self.server.stop().await;
        result
    }

    async fn send(&mut self, addr: std::net::SocketAddr) -> CheckResult<()> {
        let request = self
            .request
            .as_mut()
            .ok_or(CheckError::Usage("no request to check, call test() first"))?;
        let url = request.resolve(addr)?;

        self.jar.rotate(&self.persisted, &url);
        let headers = request.outgoing_headers(self.jar.cookie_header(&url))?;

        let mut builder = self
            .client
            .request(request.method().clone(), url.clone())
            .headers(headers);
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let started = Instant::now();
        let timeout_ms = self.config.timeout_ms;
        let response = builder
            .send()
            .await
            .map_err(|e| map_error(&e, timeout_ms))?;

        let status = response.status();
        let headers = response.headers().clone();
        let final_url = response.url().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_error(&e, timeout_ms))?
            .to_vec();
        let elapsed = started.elapsed();

        tracing::debug!(
            method = %request.method(),
            %url,
            status = status.as_u16(),
            elapsed = ?elapsed,
            "check completed"
        );

        self.response = Some(CapturedResponse::new(
            status, headers, final_url, body, elapsed,
        ));
        Ok(())
    }
}

/// Named options for a [`Checker`].
#[derive(Debug)]
pub struct CheckerBuilder {
    router: Router,
    config: CheckerConfig,
    redirect: Option<Policy>,
}

impl CheckerBuilder {
    fn new(router: Router) -> Self {
        Self {
            router,
            config: CheckerConfig::default(),
            redirect: None,
        }
    }

    /// Replace every option with `config`.
    #[must_use]
    pub fn config(mut self, config: CheckerConfig) -> Self {
        self.config = config;
        self
    }

    /// Whole-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_ms = duration_ms(timeout);
        self
    }

    /// Return 3xx responses instead of following them.
    #[must_use]
    pub fn no_redirect(mut self) -> Self {
        self.config.redirect = RedirectMode::None;
        self.redirect = None;
        self
    }

    /// Use a custom redirect policy. Takes precedence over the configured
    /// redirect mode.
    #[must_use]
    pub fn redirect_policy(mut self, policy: Policy) -> Self {
        self.redirect = Some(policy);
        self
    }

    /// `User-Agent` sent with every request.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// How long stopping the transient server may wait for connections to
    /// drain.
    #[must_use]
    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.config.shutdown_grace_ms = duration_ms(grace);
        self
    }

    /// Build the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn build(self) -> CheckResult<Checker> {
        let jar = Arc::new(SessionJar::default());
        let client = build_client(&self.config, self.redirect, Arc::clone(&jar))?;
        let server = TransientServer::new(self.router, self.config.shutdown_grace());

        Ok(Checker {
            client,
            jar,
            server,
            config: self.config,
            persisted: BTreeSet::new(),
            request: None,
            response: None,
        })
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
