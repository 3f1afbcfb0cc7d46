//! Shared router and helpers for the integration tests.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use axum::{Json, Router};
use axum::body::Bytes;
use axum::extract::Path;
use axum::http::header::{CONTENT_TYPE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::routing::{any, get};
use httpcheck::Checker;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Body served by `/json` and `/xml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "testPerson")]
pub struct TestPerson {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Age")]
    pub age: u32,
}

pub fn person() -> TestPerson {
    TestPerson {
        name: "Some".to_string(),
        age: 30,
    }
}

/// Install a test-writer subscriber once; `RUST_LOG` overrides the filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn router() -> Router {
    Router::new()
        .route("/some", get(some))
        .route("/json", get(|| async { Json(person()) }))
        .route("/xml", get(xml))
        .route("/byte", get(|| async { "hello world" }))
        .route("/cookies", get(cookies))
        .route("/mirrorbody", any(|body: Bytes| async move { body }))
        .route("/nothing", any(|| async {}))
        .route("/redirect", get(redirect))
        .route("/hop", get(|| async { (StatusCode::TEMPORARY_REDIRECT, [(LOCATION, "/byte")]) }))
        .route("/echo/{name}", any(echo_header))
        .route("/slow", get(slow))
}

/// A session on [`router`] with tracing installed.
pub fn checker() -> Checker {
    init_tracing();
    Checker::new(router()).unwrap()
}

async fn some() -> impl IntoResponse {
    (
        StatusCode::ACCEPTED,
        [
            (SET_COOKIE.as_str(), "some=cookie"),
            ("some", "header"),
            ("hello", "goodbye"),
        ],
    )
}

async fn xml() -> impl IntoResponse {
    let body = quick_xml::se::to_string(&person()).unwrap();
    ([(CONTENT_TYPE, "application/xml")], body)
}

async fn cookies() -> impl IntoResponse {
    AppendHeaders([
        (SET_COOKIE, "some=cookie"),
        (SET_COOKIE, "other=secondcookie"),
    ])
}

async fn redirect() -> impl IntoResponse {
    (
        StatusCode::TEMPORARY_REDIRECT,
        [(LOCATION, "https://localhost/redirect-test")],
    )
}

/// Responds with the value of request header `name`, or 404 when absent.
async fn echo_header(Path(name): Path<String>, headers: HeaderMap) -> impl IntoResponse {
    match headers.get(name.as_str()).and_then(|v| v.to_str().ok()) {
        Some(value) => (StatusCode::OK, value.to_string()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_millis(500)).await;
    "late"
}
