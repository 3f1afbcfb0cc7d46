//! Redirect policies configured on the session.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use httpcheck::{Checker, CheckerConfig, Method, RedirectMode};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_no_redirect_returns_redirect_response() {
    common::init_tracing();
    let mut checker = Checker::builder(common::router())
        .no_redirect()
        .build()
        .unwrap();

    checker
        .test(Method::GET, "/redirect")
        .check()
        .await
        .has_status(307)
        .has_header("location", "https://localhost/redirect-test");

    assert_eq!(checker.url().unwrap().path(), "/redirect");
    assert_eq!(checker.response().unwrap().url().path(), "/redirect");
}

#[tokio::test]
async fn test_default_policy_follows_redirects() {
    let mut checker = common::checker();

    checker
        .test(Method::GET, "/hop")
        .check()
        .await
        .has_status(200)
        .has_string("hello world");

    assert_eq!(checker.url().unwrap().path(), "/hop");
    assert_eq!(checker.response().unwrap().url().path(), "/byte");
}

#[tokio::test]
async fn test_custom_redirect_policy() {
    common::init_tracing();
    let mut checker = Checker::builder(common::router())
        .redirect_policy(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    checker.test(Method::GET, "/hop").check().await.has_status(307);
}

#[tokio::test]
async fn test_redirect_mode_from_config() {
    common::init_tracing();
    let config: CheckerConfig = serde_json::from_str(r#"{ "redirect": { "mode": "none" } }"#).unwrap();
    assert_eq!(config.redirect, RedirectMode::None);

    let mut checker = Checker::builder(common::router())
        .config(config)
        .build()
        .unwrap();

    checker
        .test(Method::GET, "/hop")
        .check()
        .await
        .has_status(307)
        .has_header("location", "/byte");
}

#[tokio::test]
#[should_panic(expected = "redirect")]
async fn test_exhausted_redirect_limit_is_fatal() {
    common::init_tracing();
    let config = CheckerConfig {
        redirect: RedirectMode::Follow { max: 0 },
        ..CheckerConfig::default()
    };
    let mut checker = Checker::builder(common::router())
        .config(config)
        .build()
        .unwrap();

    checker.test(Method::GET, "/hop").check().await;
}
