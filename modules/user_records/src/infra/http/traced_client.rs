//! reqwest wrapper that runs every outgoing request inside an `outgoing_http`
//! span and stamps it with a W3C `traceparent` header.

use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::{field::Empty, Instrument};

/// W3C Trace Context header name
pub const TRACEPARENT: &str = "traceparent";

#[derive(Clone)]
pub struct TracedClient {
    inner: reqwest::Client,
}

impl TracedClient {
    pub fn new(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Client whose requests give up after `timeout`. `None` waits forever.
    pub fn with_timeout(timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(builder.build()?))
    }

    /// Start a request; hand the finished builder to [`TracedClient::send`].
    pub fn request(&self, method: reqwest::Method, url: url::Url) -> reqwest::RequestBuilder {
        self.inner.request(method, url)
    }

    pub async fn send(&self, builder: reqwest::RequestBuilder) -> reqwest::Result<reqwest::Response> {
        self.execute(builder.build()?).await
    }

    /// Execute a built request, injecting trace headers and recording the outcome.
    pub async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let span = tracing::info_span!(
            "outgoing_http",
            http.method = %req.method(),
            http.url = %req.url(),
            http.status_code = Empty,
            otel.kind = "client",
            error = Empty,
        );

        inject_trace_context(req.headers_mut());

        let result = self.inner.execute(req).instrument(span.clone()).await;
        match &result {
            Ok(response) => {
                let status = response.status();
                span.record("http.status_code", status.as_u16());
                if status.is_client_error() || status.is_server_error() {
                    span.record("error", true);
                }
            }
            Err(_) => {
                span.record("error", true);
            }
        }
        result
    }
}

impl From<reqwest::Client> for TracedClient {
    fn from(c: reqwest::Client) -> Self {
        Self::new(c)
    }
}

impl Default for TracedClient {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

/// Stamp a fresh sampled `traceparent` (version 00) onto `headers`.
fn inject_trace_context(headers: &mut HeaderMap) {
    let trace_id = format!("{:032x}", rand::random::<u128>());
    let span_id = format!("{:016x}", rand::random::<u64>());
    let traceparent = format!("00-{trace_id}-{span_id}-01");

    if let Ok(value) = HeaderValue::from_str(&traceparent) {
        headers.insert(TRACEPARENT, value);
    }
}
