//! Checker configuration.
//!
//! Plain data with serde defaults so it can be embedded in a caller's own
//! settings file. Nothing here reads the environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default client timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default maximum number of redirects followed.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Default time allowed for the transient server to drain after a check.
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 1_000;

/// How the client reacts to 3xx responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RedirectMode {
    /// Follow up to `max` redirects.
    Follow {
        /// Maximum number of hops.
        max: usize,
    },
    /// Return the redirect response itself.
    None,
}

impl Default for RedirectMode {
    fn default() -> Self {
        Self::Follow {
            max: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// Options for a checker session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Redirect handling.
    pub redirect: RedirectMode,
    /// Optional `User-Agent` sent with every request.
    pub user_agent: Option<String>,
    /// Grace period for the transient server to shut down, in milliseconds.
    pub shutdown_grace_ms: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            redirect: RedirectMode::default(),
            user_agent: None,
            shutdown_grace_ms: DEFAULT_SHUTDOWN_GRACE_MS,
        }
    }
}

impl CheckerConfig {
    /// Client timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Shutdown grace period as a `Duration`.
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}
