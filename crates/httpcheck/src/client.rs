//! HTTP client construction using reqwest.
//!
//! The client is built once per session. Its cookie store is the session jar,
//! so `Set-Cookie` headers land there, and idle connections are never pooled
//! because every check talks to a different listener.

use std::sync::Arc;

use httpcheck_domain::{CheckerConfig, RedirectMode};
use reqwest::Client;
use reqwest::redirect::Policy;

use crate::error::CheckError;
use crate::jar::SessionJar;

/// Build the session client.
///
/// `redirect` overrides the policy derived from `config` when set.
pub(crate) fn build_client(
    config: &CheckerConfig,
    redirect: Option<Policy>,
    jar: Arc<SessionJar>,
) -> Result<Client, CheckError> {
    let policy = redirect.unwrap_or_else(|| match config.redirect {
        RedirectMode::Follow { max } => Policy::limited(max),
        RedirectMode::None => Policy::none(),
    });

    let mut builder = Client::builder()
        .timeout(config.timeout())
        .redirect(policy)
        .cookie_provider(jar)
        .pool_max_idle_per_host(0);

    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }

    builder
        .build()
        .map_err(|e| CheckError::ClientBuild(e.to_string()))
}

/// Maps reqwest errors to `CheckError`.
pub(crate) fn map_error(error: &reqwest::Error, timeout_ms: u64) -> CheckError {
    if error.is_timeout() {
        return CheckError::Timeout { timeout_ms };
    }

    if error.is_connect() {
        let message = error.to_string();
        if message.to_lowercase().contains("refused") {
            return CheckError::ConnectionRefused {
                host: error
                    .url()
                    .and_then(|u| u.host_str())
                    .unwrap_or("unknown")
                    .to_string(),
                port: error.url().and_then(url::Url::port).unwrap_or(80),
            };
        }
        return CheckError::ConnectionFailed(message);
    }

    if error.is_redirect() {
        return CheckError::Redirect(error.to_string());
    }

    if error.is_body() || error.is_decode() {
        return CheckError::BodyRead(error.to_string());
    }

    CheckError::Transport(error.to_string())
}
