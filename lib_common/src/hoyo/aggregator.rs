use super::endpoints::{auth_headers, Credentials, EndpointDescriptor};
use crate::loggers::sink::LogSink;
use crate::retrieve::fetcher::{FetchFailure, FetchOutcome, Fetcher};
use futures_util::future::join_all;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// The joined result of querying every configured endpoint once.
///
/// Invariant: there is a slot for every endpoint attempted, whether it
/// succeeded or not, so consumers must handle partial records. Built once
/// per aggregation run and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct AggregatedRecord {
    slots: BTreeMap<String, FetchOutcome>,
}

impl AggregatedRecord {
    /// Builds the record from the joined per-endpoint outcomes.
    pub fn from_slots(slots: Vec<(String, FetchOutcome)>) -> Self {
        Self {
            slots: slots.into_iter().collect(),
        }
    }

    /// Number of endpoints attempted.
    pub fn attempted(&self) -> usize {
        self.slots.len()
    }

    /// Number of endpoints that produced a payload.
    pub fn success_count(&self) -> usize {
        self.slots.values().filter(|o| o.is_success()).count()
    }

    /// Fraction of attempted endpoints that succeeded, 0.0 for an empty
    /// record.
    pub fn success_rate(&self) -> f64 {
        if self.slots.is_empty() {
            0.0
        } else {
            self.success_count() as f64 / self.attempted() as f64
        }
    }

    /// The outcome of one endpoint, if it was attempted.
    pub fn outcome(&self, name: &str) -> Option<&FetchOutcome> {
        self.slots.get(name)
    }

    /// The payload of one endpoint, if it succeeded.
    pub fn payload(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).and_then(FetchOutcome::payload)
    }

    /// Iterates over the endpoints that failed, with their markers.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &FetchFailure)> {
        self.slots
            .iter()
            .filter_map(|(name, outcome)| outcome.failure().map(|f| (name.as_str(), f)))
    }

    /// Iterates over every slot.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FetchOutcome)> {
        self.slots.iter().map(|(name, outcome)| (name.as_str(), outcome))
    }
}

/// Fans the retrying fetcher out over an endpoint catalogue.
///
/// Endpoints are independent: they run concurrently on the same scheduler,
/// one endpoint's failure never aborts the others, and the record only
/// becomes observable once every endpoint has reached a terminal result.
pub struct Aggregator {
    fetcher: Fetcher,
    sink: Arc<dyn LogSink>,
}

impl Aggregator {
    /// Creates an aggregator over the given fetcher and sink.
    pub fn new(fetcher: Fetcher, sink: Arc<dyn LogSink>) -> Self {
        Self { fetcher, sink }
    }

    /// Queries every endpoint and joins the outcomes into one record.
    pub async fn aggregate(
        &self,
        credentials: &Credentials,
        endpoints: &[EndpointDescriptor],
    ) -> AggregatedRecord {
        let headers = auth_headers(credentials);

        let fetches = endpoints.iter().map(|endpoint| {
            let headers = &headers;
            async move {
                let outcome = self.fetcher.fetch(&endpoint.request_url(), headers).await;
                (endpoint.name.clone(), outcome)
            }
        });

        self.finish(join_all(fetches).await)
    }

    /// Like [`Aggregator::aggregate`], bounded by one shared budget.
    ///
    /// Every endpoint future is armed with the same deadline before the
    /// join, so endpoints that finish in time keep their results and the
    /// rest resolve to a timed-out marker. Completed slots are never
    /// corrupted by the expiry.
    pub async fn aggregate_within(
        &self,
        credentials: &Credentials,
        endpoints: &[EndpointDescriptor],
        budget: Duration,
    ) -> AggregatedRecord {
        let headers = auth_headers(credentials);

        let fetches = endpoints.iter().map(|endpoint| {
            let headers = &headers;
            async move {
                let outcome = match timeout(budget, self.fetcher.fetch(&endpoint.request_url(), headers)).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        self.sink.error(&format!(
                            "Endpoint '{}' did not finish within {:?}",
                            endpoint.name, budget
                        ));
                        FetchOutcome::Failed(FetchFailure::TimedOut { budget })
                    }
                };
                (endpoint.name.clone(), outcome)
            }
        });

        self.finish(join_all(fetches).await)
    }

    fn finish(&self, slots: Vec<(String, FetchOutcome)>) -> AggregatedRecord {
        let record = AggregatedRecord::from_slots(slots);

        self.sink.info(&format!(
            "Aggregation finished: {}/{} endpoints succeeded ({:.0}%)",
            record.success_count(),
            record.attempted(),
            record.success_rate() * 100.0
        ));
        for (name, failure) in record.failures() {
            self.sink
                .warn(&format!("Endpoint '{}' unavailable: {}", name, failure));
        }

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loggers::sink::CaptureSink;
    use crate::retrieve::fetcher::RetryPolicy;
    use crate::retrieve::ky_http::{HttpTransport, RawReply};
    use async_trait::async_trait;
    use reqwest::header::HeaderMap;
    use serde_json::json;

    /// Transport routing by URL substring; unknown URLs get a 404.
    struct RouteTransport {
        routes: Vec<(&'static str, Result<RawReply, String>)>,
        slow_marker: Option<&'static str>,
    }

    #[async_trait]
    impl HttpTransport for RouteTransport {
        async fn get(&self, url: &str, _headers: &HeaderMap) -> anyhow::Result<RawReply> {
            if let Some(marker) = self.slow_marker {
                if url.contains(marker) {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
            for (needle, reply) in &self.routes {
                if url.contains(needle) {
                    return reply.clone().map_err(anyhow::Error::msg);
                }
            }
            Ok(RawReply {
                status: 404,
                body: String::new(),
            })
        }
    }

    fn ok(body: serde_json::Value) -> Result<RawReply, String> {
        Ok(RawReply {
            status: 200,
            body: body.to_string(),
        })
    }

    fn status(code: u16) -> Result<RawReply, String> {
        Ok(RawReply {
            status: code,
            body: String::new(),
        })
    }

    fn aggregator(routes: Vec<(&'static str, Result<RawReply, String>)>, slow: Option<&'static str>) -> (Aggregator, Arc<CaptureSink>) {
        let sink = Arc::new(CaptureSink::new());
        let transport = Arc::new(RouteTransport {
            routes,
            slow_marker: slow,
        });
        let fetcher = Fetcher::new(
            transport,
            sink.clone(),
            RetryPolicy {
                max_retries: 2,
                initial_delay: Duration::from_millis(1),
            },
        );
        (Aggregator::new(fetcher, sink.clone()), sink)
    }

    fn credentials() -> Credentials {
        Credentials {
            ltuid: "1".to_string(),
            ltoken: "t".to_string(),
            uid: "7".to_string(),
        }
    }

    fn three_endpoints() -> Vec<EndpointDescriptor> {
        vec![
            EndpointDescriptor::new("alpha", "https://example.test/alpha"),
            EndpointDescriptor::new("beta", "https://example.test/beta"),
            EndpointDescriptor::new("gamma", "https://example.test/gamma"),
        ]
    }

    #[tokio::test]
    async fn partial_failure_fills_every_slot() {
        let (aggregator, _sink) = aggregator(
            vec![
                ("alpha", ok(json!({"data": 1}))),
                ("beta", status(500)),
                ("gamma", ok(json!({"data": 3}))),
            ],
            None,
        );

        let record = aggregator
            .aggregate(&credentials(), &three_endpoints())
            .await;

        assert_eq!(record.attempted(), 3);
        assert_eq!(record.success_count(), 2);
        assert!((record.success_rate() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            record.outcome("beta").and_then(FetchOutcome::failure),
            Some(&FetchFailure::Status {
                status: 500,
                attempts: 2
            })
        );
        assert!(record.payload("alpha").is_some());
        assert!(record.payload("gamma").is_some());
    }

    #[tokio::test]
    async fn expired_budget_marks_only_unfinished_endpoints() {
        let (aggregator, _sink) = aggregator(
            vec![
                ("alpha", ok(json!({"data": 1}))),
                ("beta", ok(json!({"data": 2}))),
            ],
            Some("beta"),
        );

        let budget = Duration::from_millis(50);
        let record = aggregator
            .aggregate_within(
                &credentials(),
                &three_endpoints()[..2].to_vec(),
                budget,
            )
            .await;

        assert_eq!(record.attempted(), 2);
        assert!(record.payload("alpha").is_some());
        assert_eq!(
            record.outcome("beta").and_then(FetchOutcome::failure),
            Some(&FetchFailure::TimedOut { budget })
        );
    }

    #[tokio::test]
    async fn empty_catalogue_gives_an_empty_record() {
        let (aggregator, _sink) = aggregator(vec![], None);
        let record = aggregator.aggregate(&credentials(), &[]).await;
        assert_eq!(record.attempted(), 0);
        assert_eq!(record.success_rate(), 0.0);
    }
}
