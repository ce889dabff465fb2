//! Remote quote source contract and in-process mock.
//!
//! # Responsibility
//! - Define the async fetch/post boundary used by the sync engine.
//! - Provide `MockRemote`, which simulates latency and a fixed JSON body.
//!
//! # Invariants
//! - Implementations never block the runtime; waits use `tokio::time`.
//! - Fetch results are fully decoded quotes or an error, never partial lists.

use crate::error::ErrorKind;
use crate::model::quote::Quote;
use async_trait::async_trait;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Endpoint the mock pretends to talk to. Never contacted.
pub const MOCK_SERVER_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Status code returned for an accepted post.
pub const POST_ACCEPTED_STATUS: u16 = 201;

/// Remote boundary errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Transport-level failure.
    Network(String),
    /// Response body could not be decoded into quotes.
    Parse(String),
}

impl RemoteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Parse(_) => ErrorKind::Parse,
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "network error: {message}"),
            Self::Parse(message) => write!(f, "invalid server response: {message}"),
        }
    }
}

impl Error for RemoteError {}

/// Acknowledgment for a posted quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostAck {
    pub status: u16,
    pub quote: Quote,
}

/// Async source of authoritative quotes.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Endpoint label, for logs and status output.
    fn endpoint(&self) -> &str;

    async fn fetch_quotes(&self) -> Result<Vec<Quote>, RemoteError>;

    async fn post_quote(&self, quote: &Quote) -> Result<PostAck, RemoteError>;
}

/// Inclusive latency window in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl LatencyRange {
    pub const ZERO: Self = Self::fixed(0);

    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub const fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    pub fn is_valid(&self) -> bool {
        self.min_ms <= self.max_ms
    }

    /// Draws one delay from the window.
    pub fn sample(&self) -> Duration {
        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..=self.max_ms))
    }
}

/// Decodes a server body into quotes.
pub fn decode_quotes(body: &str) -> Result<Vec<Quote>, RemoteError> {
    serde_json::from_str(body).map_err(|err| RemoteError::Parse(err.to_string()))
}

/// Quotes served by the mock when no custom list is supplied.
pub fn default_server_quotes() -> Vec<Quote> {
    [
        (
            "Any sufficiently advanced technology is indistinguishable from magic.",
            "Technology",
        ),
        ("The unexamined life is not worth living.", "Philosophy"),
        (
            "Life is what happens when you're busy making other plans.",
            "Life",
        ),
    ]
    .into_iter()
    .map(|(text, category)| Quote {
        text: text.to_string(),
        category: category.to_string(),
    })
    .collect()
}

/// In-process stand-in for the quote server.
///
/// Latencies default to the ranges the widget simulated (1-2 s fetch,
/// 0.5-1.5 s post); tests use [`MockRemote::instant`].
pub struct MockRemote {
    endpoint: String,
    body: String,
    fetch_latency: LatencyRange,
    post_latency: LatencyRange,
    fail_fetch: AtomicBool,
    fail_post: AtomicBool,
    /// Number of upcoming fetches that fail before succeeding again.
    transient_fetch_failures: AtomicUsize,
    fetch_calls: AtomicUsize,
    posted: Mutex<Vec<Quote>>,
}

impl MockRemote {
    pub fn new(quotes: &[Quote]) -> Self {
        // Serializing a plain `{text, category}` list cannot fail.
        let body = serde_json::to_string(quotes).unwrap_or_else(|_| "[]".to_string());
        Self::with_raw_body(body)
    }

    /// Mock serving an arbitrary response body, e.g. malformed JSON.
    pub fn with_raw_body(body: impl Into<String>) -> Self {
        Self {
            endpoint: MOCK_SERVER_URL.to_string(),
            body: body.into(),
            fetch_latency: LatencyRange::new(1_000, 2_000),
            post_latency: LatencyRange::new(500, 1_500),
            fail_fetch: AtomicBool::new(false),
            fail_post: AtomicBool::new(false),
            transient_fetch_failures: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            posted: Mutex::new(Vec::new()),
        }
    }

    /// Default server quotes with no simulated latency.
    pub fn instant() -> Self {
        Self::new(&default_server_quotes()).with_latency(LatencyRange::ZERO, LatencyRange::ZERO)
    }

    pub fn with_latency(mut self, fetch: LatencyRange, post: LatencyRange) -> Self {
        self.fetch_latency = fetch;
        self.post_latency = post;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Toggles a persistent fetch outage.
    pub fn set_fetch_failure(&self, failing: bool) {
        self.fail_fetch.store(failing, Ordering::SeqCst);
    }

    pub fn set_post_failure(&self, failing: bool) {
        self.fail_post.store(failing, Ordering::SeqCst);
    }

    /// Makes the next `count` fetches fail.
    pub fn fail_next_fetches(&self, count: usize) {
        self.transient_fetch_failures.store(count, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn posted(&self) -> Vec<Quote> {
        self.posted
            .lock()
            .map(|posted| posted.clone())
            .unwrap_or_default()
    }

    fn take_transient_failure(&self) -> bool {
        self.transient_fetch_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok()
    }
}

impl Default for MockRemote {
    fn default() -> Self {
        Self::new(&default_server_quotes())
    }
}

#[async_trait]
impl RemoteSource for MockRemote {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn fetch_quotes(&self) -> Result<Vec<Quote>, RemoteError> {
        let call = self.fetch_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self.fetch_latency.sample();
        debug!(
            "event=remote_fetch module=sync status=start call={call} delay_ms={}",
            delay.as_millis()
        );
        tokio::time::sleep(delay).await;

        if self.fail_fetch.load(Ordering::SeqCst) || self.take_transient_failure() {
            return Err(RemoteError::Network(format!(
                "simulated outage contacting {}",
                self.endpoint
            )));
        }
        decode_quotes(&self.body)
    }

    async fn post_quote(&self, quote: &Quote) -> Result<PostAck, RemoteError> {
        tokio::time::sleep(self.post_latency.sample()).await;

        if self.fail_post.load(Ordering::SeqCst) {
            return Err(RemoteError::Network(format!(
                "simulated outage posting to {}",
                self.endpoint
            )));
        }
        if let Ok(mut posted) = self.posted.lock() {
            posted.push(quote.clone());
        }
        Ok(PostAck {
            status: POST_ACCEPTED_STATUS,
            quote: quote.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        decode_quotes, LatencyRange, MockRemote, RemoteError, RemoteSource, MOCK_SERVER_URL,
    };
    use crate::error::ErrorKind;
    use std::time::Duration;

    #[test]
    fn latency_sample_stays_in_window() {
        let range = LatencyRange::new(5, 9);
        for _ in 0..64 {
            let sampled = range.sample();
            assert!(sampled >= Duration::from_millis(5));
            assert!(sampled <= Duration::from_millis(9));
        }
        assert_eq!(LatencyRange::fixed(3).sample(), Duration::from_millis(3));
    }

    #[test]
    fn decode_rejects_non_quote_body() {
        let err = decode_quotes(r#"{"userId":1}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn endpoint_defaults_to_mock_url_and_can_be_overridden() {
        assert_eq!(MockRemote::default().endpoint(), MOCK_SERVER_URL);
        let remote = MockRemote::instant().with_endpoint("http://localhost:9/quotes");
        assert_eq!(remote.endpoint(), "http://localhost:9/quotes");
    }

    #[tokio::test]
    async fn transient_failures_are_consumed_in_order() {
        let remote = MockRemote::instant();
        remote.fail_next_fetches(1);

        let first = remote.fetch_quotes().await;
        assert!(matches!(first, Err(RemoteError::Network(_))));
        let second = remote.fetch_quotes().await.unwrap();
        assert_eq!(second.len(), 3);
        assert_eq!(remote.fetch_calls(), 2);
    }
}
