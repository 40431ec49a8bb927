//! # Retrying Fetcher Live Tests
//!
//! This binary exercises the retrying fetcher against `httpbin.org`, a
//! public, well-behaved endpoint, to verify the three outcome classes on a
//! real network path: a decoded success, an exhausted status failure, and
//! a terminal decode failure on a 200 with a non-JSON body.
//!
//! These checks are executed asynchronously using `tokio::main`.

use lib_common::loggers::loggerlocal::LoggerLocal;
use lib_common::loggers::sink::LogSink;
use lib_common::retrieve::fetcher::{FetchFailure, Fetcher, RetryPolicy};
use lib_common::retrieve::ky_http::RestClient;
use reqwest::header::HeaderMap;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger: Arc<dyn LogSink> = Arc::new(LoggerLocal::new("test_fetch_live".to_string(), None));
    let transport = Arc::new(RestClient::new(logger.clone()));
    let headers = HeaderMap::new();

    println!("--- Starting Fetcher Live Tests ---");

    // --- TEST 1: Success path ---
    // A 200 with a JSON body must decode and return a payload.
    println!("\n[Test 1] GET https://httpbin.org/json ...");
    let fetcher = Fetcher::new(
        transport.clone(),
        logger.clone(),
        RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
        },
    );
    let outcome = fetcher.fetch("https://httpbin.org/json", &headers).await;
    assert!(outcome.is_success(), "expected a decoded payload");
    println!("OK decoded payload received");

    // --- TEST 2: Status failure path ---
    // Persistent 500s must exhaust the budget and surface the last status.
    println!("\n[Test 2] GET https://httpbin.org/status/500 (2 attempts) ...");
    let fetcher = Fetcher::new(
        transport.clone(),
        logger.clone(),
        RetryPolicy {
            max_retries: 2,
            initial_delay: Duration::from_secs(1),
        },
    );
    let outcome = fetcher
        .fetch("https://httpbin.org/status/500", &headers)
        .await;
    match outcome.failure() {
        Some(FetchFailure::Status { status, attempts }) => {
            assert_eq!(*status, 500);
            assert_eq!(*attempts, 2);
            println!("OK terminal status failure after {} attempts", attempts);
        }
        other => panic!("expected a status failure, got {:?}", other),
    }

    // --- TEST 3: Decode failure path ---
    // A 200 with an HTML body must fail terminally without retrying.
    println!("\n[Test 3] GET https://httpbin.org/html ...");
    let outcome = fetcher.fetch("https://httpbin.org/html", &headers).await;
    match outcome.failure() {
        Some(FetchFailure::Decode { .. }) => println!("OK decode failure, not retried"),
        other => panic!("expected a decode failure, got {:?}", other),
    }

    println!("\n--- All Fetcher Live Tests Passed ---");
    Ok(())
}
