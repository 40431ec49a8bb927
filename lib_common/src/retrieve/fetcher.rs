use super::backoff::Backoff;
use super::ky_http::HttpTransport;
use crate::loggers::sink::LogSink;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

/// The attempt budget and backoff timing of one fetcher.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum attempts per call, including the first one. At least 1.
    pub max_retries: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
/// Terminal failure marker: why a fetch could not produce a payload.
pub enum FetchFailure {
    /// Every attempt ended in a non-200 status; carries the last one seen.
    #[error("request failed with status {status} after {attempts} attempt(s)")]
    Status {
        /// The last HTTP status code observed.
        status: u16,
        /// How many attempts were made.
        attempts: u32,
    },

    /// Every attempt ended in a transport-level error; carries the last one.
    #[error("transport error after {attempts} attempt(s): {message}")]
    Transport {
        /// Description of the last transport error.
        message: String,
        /// How many attempts were made.
        attempts: u32,
    },

    /// A 200 response carried a body that is not valid JSON. Never retried:
    /// a malformed success body is a server bug that retrying would mask.
    #[error("response body is not valid JSON: {message}")]
    Decode {
        /// The JSON decoder's error description.
        message: String,
    },

    /// The aggregation budget expired before this fetch reached a terminal
    /// result.
    #[error("no terminal result within the {budget:?} aggregation budget")]
    TimedOut {
        /// The budget that expired.
        budget: Duration,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// The result of one fetch call: a decoded payload or a terminal failure.
pub enum FetchOutcome {
    /// The JSON-decoded response payload.
    Success(Value),
    /// The terminal failure marker after exhausting the attempt budget.
    Failed(FetchFailure),
}

impl FetchOutcome {
    /// Whether this outcome carries a payload.
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    /// The payload, if any.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            FetchOutcome::Failed(_) => None,
        }
    }

    /// The failure marker, if any.
    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchOutcome::Success(_) => None,
            FetchOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// The retrying fetch primitive.
///
/// Holds no state across calls; every call runs its own attempt loop over
/// the injected transport and resolves into a [`FetchOutcome`]. Backoff
/// waits are plain `sleep`s, so sibling fetches on the same scheduler keep
/// running while one call backs off.
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    sink: Arc<dyn LogSink>,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher over the given transport and observability sink.
    pub fn new(transport: Arc<dyn HttpTransport>, sink: Arc<dyn LogSink>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            sink,
            policy,
        }
    }

    /// The policy this fetcher runs with.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Performs up to `max_retries` GET attempts against `url`.
    ///
    /// A 200 response is decoded as JSON and returned immediately; a 200
    /// with an undecodable body is a terminal decode failure. Any other
    /// status or transport error is retried after the next backoff delay
    /// until the budget is exhausted, at which point the last error becomes
    /// the terminal failure marker.
    pub async fn fetch(&self, url: &str, headers: &HeaderMap) -> FetchOutcome {
        let budget = self.policy.max_retries.max(1);
        let mut delays = Backoff::new(self.policy.initial_delay);
        let mut last_failure = FetchFailure::Transport {
            message: "no attempt was made".to_string(),
            attempts: 0,
        };

        for attempt in 1..=budget {
            match self.transport.get(url, headers).await {
                Ok(reply) if reply.status == 200 => {
                    return match serde_json::from_str::<Value>(&reply.body) {
                        Ok(payload) => {
                            self.sink
                                .debug(&format!("Fetched {} on attempt {}", url, attempt));
                            FetchOutcome::Success(payload)
                        }
                        Err(e) => {
                            self.sink.error(&format!(
                                "Malformed response body from {}: {}",
                                url, e
                            ));
                            FetchOutcome::Failed(FetchFailure::Decode {
                                message: e.to_string(),
                            })
                        }
                    };
                }
                Ok(reply) => {
                    self.sink.error(&format!(
                        "Failed attempt {} for {}, Status code: {}",
                        attempt, url, reply.status
                    ));
                    last_failure = FetchFailure::Status {
                        status: reply.status,
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    self.sink
                        .error(&format!("Attempt {} failed: {}", attempt, e));
                    last_failure = FetchFailure::Transport {
                        message: e.to_string(),
                        attempts: attempt,
                    };
                }
            }

            if attempt < budget {
                let delay = delays.advance();
                self.sink
                    .debug(&format!("Retrying {} in {:?}", url, delay));
                sleep(delay).await;
            }
        }

        self.sink.error("Max retries reached. Request failed.");
        FetchOutcome::Failed(last_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loggers::sink::{CaptureSink, Level};
    use crate::retrieve::ky_http::RawReply;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport stub replaying a scripted sequence of replies.
    struct ScriptTransport {
        script: Mutex<VecDeque<Result<RawReply, String>>>,
        calls: AtomicUsize,
    }

    impl ScriptTransport {
        fn new(script: Vec<Result<RawReply, String>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptTransport {
        async fn get(&self, _url: &str, _headers: &HeaderMap) -> anyhow::Result<RawReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .expect("script lock")
                .pop_front()
                .expect("script exhausted");
            next.map_err(anyhow::Error::msg)
        }
    }

    fn reply(status: u16, body: &str) -> Result<RawReply, String> {
        Ok(RawReply {
            status,
            body: body.to_string(),
        })
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_millis(1),
        }
    }

    fn fetcher(transport: Arc<ScriptTransport>, sink: Arc<CaptureSink>, max_retries: u32) -> Fetcher {
        Fetcher::new(transport, sink, fast_policy(max_retries))
    }

    #[tokio::test]
    async fn returns_payload_on_200() {
        let transport = Arc::new(ScriptTransport::new(vec![reply(200, r#"{"ok": true}"#)]));
        let sink = Arc::new(CaptureSink::new());
        let result = fetcher(transport.clone(), sink, 3)
            .fetch("https://example.test/a", &HeaderMap::new())
            .await;

        assert_eq!(
            result.payload(),
            Some(&serde_json::json!({"ok": true}))
        );
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn exhausts_budget_on_repeated_500() {
        let transport = Arc::new(ScriptTransport::new(vec![
            reply(500, ""),
            reply(500, ""),
            reply(500, ""),
        ]));
        let sink = Arc::new(CaptureSink::new());
        let result = fetcher(transport.clone(), sink.clone(), 3)
            .fetch("https://example.test/a", &HeaderMap::new())
            .await;

        assert_eq!(transport.calls(), 3);
        assert_eq!(
            result.failure(),
            Some(&FetchFailure::Status {
                status: 500,
                attempts: 3
            })
        );
        // One error per attempt plus the exhaustion report.
        assert_eq!(sink.count(Level::Error), 4);
    }

    #[tokio::test]
    async fn schedules_two_geometric_waits_for_three_failures() {
        let transport = Arc::new(ScriptTransport::new(vec![
            reply(500, ""),
            reply(500, ""),
            reply(500, ""),
        ]));
        let sink = Arc::new(CaptureSink::new());
        fetcher(transport, sink.clone(), 3)
            .fetch("https://example.test/a", &HeaderMap::new())
            .await;

        let waits: Vec<String> = sink
            .messages()
            .into_iter()
            .filter(|m| m.starts_with("Retrying"))
            .collect();
        assert_eq!(waits.len(), 2);
        assert!(waits[0].ends_with("in 1ms"));
        assert!(waits[1].ends_with("in 2ms"));
    }

    #[tokio::test]
    async fn recovers_on_a_later_attempt() {
        let transport = Arc::new(ScriptTransport::new(vec![
            reply(503, ""),
            reply(200, r#"{"value": 7}"#),
        ]));
        let sink = Arc::new(CaptureSink::new());
        let result = fetcher(transport.clone(), sink, 3)
            .fetch("https://example.test/a", &HeaderMap::new())
            .await;

        assert!(result.is_success());
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn malformed_success_body_is_never_retried() {
        let transport = Arc::new(ScriptTransport::new(vec![
            reply(200, "<html>not json</html>"),
            reply(200, r#"{"would": "succeed"}"#),
        ]));
        let sink = Arc::new(CaptureSink::new());
        let result = fetcher(transport.clone(), sink, 3)
            .fetch("https://example.test/a", &HeaderMap::new())
            .await;

        assert_eq!(transport.calls(), 1);
        assert!(matches!(
            result.failure(),
            Some(FetchFailure::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn transport_errors_exhaust_the_budget_too() {
        let transport = Arc::new(ScriptTransport::new(vec![
            Err("connection reset".to_string()),
            Err("connection reset".to_string()),
        ]));
        let sink = Arc::new(CaptureSink::new());
        let result = fetcher(transport.clone(), sink, 2)
            .fetch("https://example.test/a", &HeaderMap::new())
            .await;

        assert_eq!(transport.calls(), 2);
        assert_eq!(
            result.failure(),
            Some(&FetchFailure::Transport {
                message: "connection reset".to_string(),
                attempts: 2
            })
        );
    }

    #[tokio::test]
    async fn a_budget_of_one_makes_exactly_one_attempt() {
        let transport = Arc::new(ScriptTransport::new(vec![
            reply(500, ""),
            reply(200, r#"{}"#),
        ]));
        let sink = Arc::new(CaptureSink::new());
        let result = fetcher(transport.clone(), sink, 1)
            .fetch("https://example.test/a", &HeaderMap::new())
            .await;

        assert_eq!(transport.calls(), 1);
        assert_eq!(
            result.failure(),
            Some(&FetchFailure::Status {
                status: 500,
                attempts: 1
            })
        );
    }
}
