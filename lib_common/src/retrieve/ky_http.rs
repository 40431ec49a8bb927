//! # HTTP Transport
//!
//! This module provides the raw HTTP transport behind the retrying fetcher.
//! It wraps `reqwest` through `reqwest_middleware`, reporting every outgoing
//! attempt to the observability sink, and never turns a non-2xx status into
//! an error; status policy belongs to the caller.

use crate::loggers::sink::LogSink;
use async_trait::async_trait;
use http::Extensions;
use reqwest::header::HeaderMap;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A transport-level reply: the status code and the undecoded body.
///
/// Decoding is left to the caller so that a 200 with a malformed body can
/// be told apart from a status failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    /// The numeric HTTP status code.
    pub status: u16,
    /// The raw response body.
    pub body: String,
}

/// The transport capability consumed by the fetcher.
///
/// `RestClient` below is the shipped raw-HTTP implementation; an
/// authenticated game-account client can implement the same contract and
/// slot in without changing the fetch or aggregation layers.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs one GET against `url` with the given headers.
    ///
    /// Errors represent transport-level problems (connection, TLS, malformed
    /// URL); HTTP status codes are data, not errors.
    async fn get(&self, url: &str, headers: &HeaderMap) -> anyhow::Result<RawReply>;
}

/// Middleware reporting each outgoing request to the observability sink.
struct AttemptReporter {
    sink: Arc<dyn LogSink>,
}

#[async_trait]
impl Middleware for AttemptReporter {
    async fn handle(
        &self,
        req: reqwest::Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        self.sink
            .debug(&format!("{} {}", req.method(), req.url()));
        next.run(req, extensions).await
    }
}

/// The raw-HTTP implementation of [`HttpTransport`].
///
/// One instance holds one pooled `reqwest` client; sharing it across
/// concurrent fetches reuses connections, and dropping it releases them on
/// every exit path.
pub struct RestClient {
    /// The underlying middleware-enabled client.
    inner: ClientWithMiddleware,
}

impl RestClient {
    /// Creates a client with a request timeout and a browser-like pool,
    /// reporting attempts to `sink`.
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("wishtrack/0.1")
            .build()
            .unwrap_or_default();

        let inner = ClientBuilder::new(client)
            .with(AttemptReporter { sink })
            .build();

        Self { inner }
    }
}

#[async_trait]
impl HttpTransport for RestClient {
    async fn get(&self, url: &str, headers: &HeaderMap) -> anyhow::Result<RawReply> {
        // Reject malformed URLs before touching the network.
        let parsed = Url::parse(url)?;

        let response = self.inner.get(parsed).headers(headers.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawReply { status, body })
    }
}
