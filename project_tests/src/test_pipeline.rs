//! # Offline Pipeline Test
//!
//! This binary runs the whole fetch → aggregate → analyze → export chain
//! over a scripted transport, with one endpoint permanently failing, and
//! checks that the run degrades instead of aborting: every endpoint gets a
//! slot, analytics run over the available wishes, and the export files
//! land in a temporary directory.

use async_trait::async_trait;
use lib_common::analytics::{analyze, log_summary};
use lib_common::exports::report::{build_report, save_characters, save_report, save_wishes};
use lib_common::hoyo::aggregator::Aggregator;
use lib_common::hoyo::endpoints::{default_endpoints, Credentials};
use lib_common::hoyo::models::{characters_from_record, user_info_from_record, wishes_from_record};
use lib_common::loggers::loggerlocal::LoggerLocal;
use lib_common::loggers::sink::LogSink;
use lib_common::retrieve::fetcher::{Fetcher, RetryPolicy};
use lib_common::retrieve::ky_http::{HttpTransport, RawReply};
use reqwest::header::HeaderMap;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Serves canned payloads by URL substring; the game_record endpoint is
/// scripted to stay down.
struct ScriptedTransport;

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &str, _headers: &HeaderMap) -> anyhow::Result<RawReply> {
        let body = if url.contains("getUserFullInfo") {
            json!({
                "retcode": 0,
                "data": { "user_info": {
                    "nickname": "Aether",
                    "level": 58,
                    "region": "os_euro"
                }}
            })
        } else if url.contains("wish/history") {
            json!({
                "retcode": 0,
                "data": { "list": [
                    {"name": "Diluc", "rarity": 5, "item_type": "Standard Wish", "time": "2024-01-02 03:04:05"},
                    {"name": "Amber", "rarity": 4, "item_type": "Standard Wish", "time": "2024-01-02 03:05:06"},
                    {"name": "Amber", "rarity": 4, "item_type": "Standard Wish", "time": "2024-01-02 03:06:07"}
                ]}
            })
        } else if url.contains("event/sol/info") {
            json!({"retcode": 0, "data": {"is_sign": true}})
        } else {
            // game_record stays down for the whole run.
            return Ok(RawReply {
                status: 503,
                body: String::new(),
            });
        };

        Ok(RawReply {
            status: 200,
            body: body.to_string(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger: Arc<dyn LogSink> = Arc::new(LoggerLocal::new("test_pipeline".to_string(), None));

    println!("--- Starting Offline Pipeline Test ---");

    let credentials = Credentials {
        ltuid: "111918821".to_string(),
        ltoken: "v2_test_token".to_string(),
        uid: "700000001".to_string(),
    };
    credentials.validate()?;

    let fetcher = Fetcher::new(
        Arc::new(ScriptedTransport),
        logger.clone(),
        RetryPolicy {
            max_retries: 2,
            initial_delay: Duration::from_millis(10),
        },
    );
    let aggregator = Aggregator::new(fetcher, logger.clone());

    // --- Phase 1: Aggregate with one endpoint down ---
    let endpoints = default_endpoints(&credentials.uid);
    let record = aggregator
        .aggregate_within(&credentials, &endpoints, Duration::from_secs(5))
        .await;
    assert_eq!(record.attempted(), 4);
    assert_eq!(record.success_count(), 3);
    println!("OK aggregation degraded, not aborted");

    // --- Phase 2: Extract and analyze the available data ---
    let wishes = wishes_from_record(&record, logger.as_ref());
    let characters = characters_from_record(&record, logger.as_ref());
    let user = user_info_from_record(&record, logger.as_ref());
    assert_eq!(wishes.len(), 3);
    assert!(characters.is_empty());

    let summary = analyze(&wishes, 5).expect("non-empty history");
    assert_eq!(summary.top_items[0], ("Amber".to_string(), 2));
    log_summary(&summary, logger.as_ref());

    // --- Phase 3: Export everything into a temp directory ---
    let out = tempfile::tempdir()?;
    save_characters(&characters, out.path(), logger.as_ref());
    save_wishes(&wishes, out.path(), logger.as_ref());
    let report = build_report(user.as_ref(), &characters, &wishes)?;
    save_report(&report, out.path(), logger.as_ref());

    for artifact in [
        "characters.json",
        "characters.csv",
        "wishes.json",
        "wishes.csv",
        "user_report.json",
    ] {
        assert!(out.path().join(artifact).exists(), "missing {}", artifact);
        println!("OK wrote {}", artifact);
    }

    println!("\n--- Offline Pipeline Test Passed ---");
    Ok(())
}
