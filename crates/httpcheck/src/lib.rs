//! httpcheck - HTTP endpoint assertions
//!
//! Serves an [`axum::Router`] on a fresh loopback port for each check, sends
//! one request to it and offers a fluent chain of assertions on the
//! response.
//!
//! ```no_run
//! use axum::{Router, routing::get};
//! use httpcheck::{Checker, Method};
//!
//! # async fn run() -> Result<(), httpcheck::CheckError> {
//! let router = Router::new().route("/hello", get(|| async { "hello world" }));
//! let mut checker = Checker::new(router)?;
//!
//! checker
//!     .test(Method::GET, "/hello")
//!     .check()
//!     .await
//!     .has_status(200)
//!     .has_string("hello world");
//! # Ok(())
//! # }
//! ```

pub mod checker;
mod client;
pub mod error;
pub mod jar;
pub mod reporter;
pub mod request;
pub mod response;
pub mod server;
pub mod tester;

pub use checker::{Checker, CheckerBuilder};
pub use error::{CheckError, CheckResult};
pub use jar::SessionJar;
pub use reporter::{PanicReporter, RecordingReporter, Reporter};
pub use request::PendingRequest;
pub use response::CapturedResponse;
pub use server::TransientServer;
pub use tester::Tester;

pub use httpcheck_domain::{
    CheckerConfig, Cookie, CookieJar, FieldPart, FilePart, FormPart, Payload, RedirectMode,
};
pub use reqwest::{Method, StatusCode};
