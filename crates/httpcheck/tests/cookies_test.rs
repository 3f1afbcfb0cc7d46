//! Cookie persistence across checks and cookie assertions.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;

use axum::Router;
use axum::http::header::SET_COOKIE;
use axum::routing::get;
use httpcheck::{Checker, Method, RecordingReporter, Reporter};
use pretty_assertions::assert_eq;

/// Routes whose cookies carry unusual lifetimes and paths.
fn scoped_checker() -> Checker {
    common::init_tracing();
    let router = Router::new()
        .route(
            "/long-lived",
            get(|| async { [(SET_COOKIE, "sid=1; Max-Age=99999999999999")] }),
        )
        .route("/auth/login", get(|| async { [(SET_COOKIE, "sid=1")] }))
        .route("/auth/whoami", get(|| async {}))
        .route("/nothing", get(|| async {}));
    Checker::new(router).unwrap()
}

#[tokio::test]
async fn test_persisted_cookie_survives_next_check() {
    let mut checker = common::checker();
    checker.persist_cookie("some");

    checker
        .test(Method::GET, "/cookies")
        .check()
        .await
        .has_cookie("some", "cookie")
        .has_cookie("other", "secondcookie");

    let reporter = Arc::new(RecordingReporter::new());
    checker
        .test(Method::GET, "/nothing")
        .report_to(reporter.clone())
        .check()
        .await
        .has_cookie("some", "cookie")
        .has_cookie("other", "secondcookie");

    assert_eq!(
        reporter.failures(),
        vec!["cookie not found, expected other=secondcookie"]
    );
}

#[tokio::test]
async fn test_unpersisted_cookie_is_dropped() {
    let mut checker = common::checker();
    checker.persist_cookie("some");

    checker
        .test(Method::GET, "/cookies")
        .check()
        .await
        .has_cookie("some", "cookie");

    let mut tester = checker.test(Method::GET, "/nothing");
    tester.check().await.has_cookie("some", "cookie");
    tester.unpersist_cookie("some");
    drop(tester);

    let reporter = Arc::new(RecordingReporter::new());
    checker
        .test(Method::GET, "/nothing")
        .report_to(reporter.clone())
        .check()
        .await
        .has_cookie("some", "cookie");

    assert!(reporter.failed());
    assert!(checker.cookies().is_empty());
}

#[tokio::test]
async fn test_persisted_cookie_is_sent_to_next_listener() {
    let mut checker = common::checker();
    checker.persist_cookie("some");

    checker.test(Method::GET, "/some").check().await.has_status(202);

    checker
        .test(Method::GET, "/echo/cookie")
        .check()
        .await
        .has_status(200)
        .has_string("some=cookie");
}

#[tokio::test]
async fn test_with_cookie_is_sent() {
    let mut checker = common::checker();

    checker
        .test(Method::GET, "/echo/cookie")
        .with_cookie("key", "value")
        .with_cookie("key", "value")
        .check()
        .await
        .has_status(200)
        .has_string("key=value; key=value");
}

#[tokio::test]
async fn test_has_cookie_cases() {
    let cases = [
        ("some", "cookie", false),
        ("some", "unknown", true),
        ("unknown", "cookie", true),
    ];

    for (key, value, want_failure) in cases {
        let mut checker = common::checker();
        let reporter = Arc::new(RecordingReporter::new());

        checker
            .test(Method::GET, "/some")
            .report_to(reporter.clone())
            .check()
            .await
            .has_cookie(key, value);

        assert_eq!(reporter.failed(), want_failure, "{key}={value}");
    }
}

#[tokio::test]
#[should_panic(expected = "cookie not found, expected some=unknown")]
async fn test_must_have_cookie_stops_the_chain() {
    let mut checker = common::checker();
    checker
        .test(Method::GET, "/some")
        .check()
        .await
        .must_have_cookie("some", "unknown")
        .cb(|_| panic!("callback must not run after a fatal assertion"));
}

#[tokio::test]
async fn test_huge_max_age_is_stored() {
    let mut checker = scoped_checker();
    checker
        .test(Method::GET, "/long-lived")
        .check()
        .await
        .has_status(200)
        .has_cookie("sid", "1");

    let jar = checker.cookies();
    let cookie = jar.find(checker.url().unwrap(), "sid").unwrap();
    assert!(!cookie.is_expired());
}

#[tokio::test]
async fn test_cookie_without_path_is_scoped_to_request_directory() {
    let mut checker = scoped_checker();
    checker.persist_cookie("sid");

    checker
        .test(Method::GET, "/auth/login")
        .check()
        .await
        .has_cookie("sid", "1");
    assert_eq!(checker.cookies().find(checker.url().unwrap(), "sid").unwrap().path, "/auth");

    checker
        .test(Method::GET, "/auth/whoami")
        .check()
        .await
        .has_cookie("sid", "1");

    let reporter = Arc::new(RecordingReporter::new());
    checker
        .test(Method::GET, "/nothing")
        .report_to(reporter.clone())
        .check()
        .await
        .has_cookie("sid", "1");
    assert_eq!(reporter.failures(), vec!["cookie not found, expected sid=1"]);
}
