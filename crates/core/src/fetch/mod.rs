//! JSON fetching with retries and an in-memory response cache.
//!
//! The [`Fetcher`] never surfaces an error to its caller: every attempt
//! failure is logged and retried according to the injected [`RetryPolicy`],
//! and exhausting the policy yields `None`.

mod cache;
mod http;
mod retry;

pub use cache::ResponseCache;
pub use http::ReqwestTransport;
pub use retry::RetryPolicy;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::metrics;

/// A decoded JSON object payload.
pub type JsonObject = serde_json::Map<String, Value>;

/// Errors from a single fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Could not reach the remote host.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Response body was not valid JSON.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::NotFound(_))
    }
}

/// A single-attempt JSON transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and decode the body as JSON.
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// Retrying, caching JSON fetcher.
pub struct Fetcher<T> {
    transport: T,
    retry: RetryPolicy,
    cache: ResponseCache,
}

impl<T: Transport> Fetcher<T> {
    /// Create a fetcher over the given transport.
    pub fn new(transport: T, retry: RetryPolicy, cache: ResponseCache) -> Self {
        Self {
            transport,
            retry,
            cache,
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Fetch `url` as a JSON object.
    ///
    /// Returns a cached object when one younger than `cache_ttl` exists.
    /// Returns `None` when every attempt failed or the payload was not a
    /// JSON object.
    pub async fn fetch_json(&self, url: &str, cache_ttl: Duration) -> Option<JsonObject> {
        if !cache_ttl.is_zero() {
            if let Some(hit) = self.cache.get(url, cache_ttl).await {
                metrics::CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
                debug!("Cache hit for {}", url);
                return Some(hit);
            }
            metrics::CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
        }

        let max_attempts = self.retry.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            let remaining = max_attempts - attempt;
            let started = Instant::now();
            let result = self.transport.get_json(url).await;
            let elapsed = started.elapsed().as_secs_f64();

            match result {
                Ok(Value::Object(object)) => {
                    metrics::FETCH_ATTEMPTS.with_label_values(&["success"]).inc();
                    metrics::FETCH_DURATION
                        .with_label_values(&["success"])
                        .observe(elapsed);
                    self.cache.insert(url, object.clone(), cache_ttl).await;
                    return Some(object);
                }
                Ok(_) => {
                    metrics::FETCH_ATTEMPTS
                        .with_label_values(&["not_object"])
                        .inc();
                    metrics::FETCH_DURATION
                        .with_label_values(&["error"])
                        .observe(elapsed);
                    warn!(
                        "Response from {} is not a JSON object, will try {} more time(s) before giving up",
                        url, remaining
                    );
                }
                Err(e) if !e.is_retryable() => {
                    metrics::FETCH_ATTEMPTS
                        .with_label_values(&["not_found"])
                        .inc();
                    metrics::FETCH_DURATION
                        .with_label_values(&["error"])
                        .observe(elapsed);
                    debug!("Not retrying {}: {}", url, e);
                    break;
                }
                Err(e) => {
                    metrics::FETCH_ATTEMPTS.with_label_values(&["error"]).inc();
                    metrics::FETCH_DURATION
                        .with_label_values(&["error"])
                        .observe(elapsed);
                    warn!(
                        "Error fetching JSON from {}: {}, will try {} more time(s) before giving up",
                        url, e, remaining
                    );
                }
            }

            if remaining > 0 {
                let delay = self.retry.delay_for(attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        metrics::FETCH_FAILURES.inc();
        warn!("Error fetching JSON from Douban: {}", url);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use serde_json::json;

    fn fetcher(transport: MockTransport, attempts: u32) -> Fetcher<MockTransport> {
        Fetcher::new(
            transport,
            RetryPolicy::no_delay(attempts),
            ResponseCache::new(16),
        )
    }

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_fetch_returns_object() {
        let transport = MockTransport::new();
        transport
            .respond("http://api/subject/1", json!({"title": "Alien"}))
            .await;

        let fetcher = fetcher(transport, 3);
        let object = fetcher.fetch_json("http://api/subject/1", TTL).await.unwrap();
        assert_eq!(object["title"], "Alien");
        assert_eq!(fetcher.transport().request_count().await, 1);
    }

    #[tokio::test]
    async fn test_fetch_retries_then_succeeds() {
        let transport = MockTransport::new();
        transport
            .respond("http://api/subject/1", json!({"title": "Alien"}))
            .await;
        transport.fail_next(2).await;

        let fetcher = fetcher(transport, 3);
        let object = fetcher.fetch_json("http://api/subject/1", TTL).await;
        assert!(object.is_some());
        assert_eq!(fetcher.transport().request_count().await, 3);
    }

    #[tokio::test]
    async fn test_fetch_gives_up_after_max_attempts() {
        let transport = MockTransport::new();
        transport
            .respond("http://api/subject/1", json!({"title": "Alien"}))
            .await;
        transport.fail_next(3).await;

        let fetcher = fetcher(transport, 3);
        assert!(fetcher.fetch_json("http://api/subject/1", TTL).await.is_none());
        assert_eq!(fetcher.transport().request_count().await, 3);
    }

    #[tokio::test]
    async fn test_fetch_non_object_is_none() {
        let transport = MockTransport::new();
        transport
            .respond("http://api/search", json!(["not", "an", "object"]))
            .await;

        let fetcher = fetcher(transport, 2);
        assert!(fetcher.fetch_json("http://api/search", TTL).await.is_none());
        assert_eq!(fetcher.transport().request_count().await, 2);
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_not_retried() {
        let fetcher = fetcher(MockTransport::new(), 3);
        assert!(fetcher.fetch_json("http://api/subject/404", TTL).await.is_none());
        assert_eq!(fetcher.transport().request_count().await, 1);
    }

    #[tokio::test]
    async fn test_fetch_uses_cache_within_ttl() {
        let transport = MockTransport::new();
        transport
            .respond("http://api/subject/1", json!({"title": "Alien"}))
            .await;

        let fetcher = fetcher(transport, 3);
        fetcher.fetch_json("http://api/subject/1", TTL).await.unwrap();
        fetcher.fetch_json("http://api/subject/1", TTL).await.unwrap();
        assert_eq!(fetcher.transport().request_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_cache_honours_caller_ttl() {
        let transport = MockTransport::new();
        transport
            .respond("http://api/imdb/tt1", json!({"title": "Alien"}))
            .await;
        let fetcher = fetcher(transport, 3);
        let week = Duration::from_secs(7 * 24 * 60 * 60);
        let three_hours = Duration::from_secs(3 * 60 * 60);

        fetcher.fetch_json("http://api/imdb/tt1", week).await.unwrap();
        tokio::time::advance(Duration::from_secs(4 * 60 * 60)).await;

        fetcher.fetch_json("http://api/imdb/tt1", week).await.unwrap();
        assert_eq!(fetcher.transport().request_count().await, 1);

        fetcher
            .fetch_json("http://api/imdb/tt1", three_hours)
            .await
            .unwrap();
        assert_eq!(fetcher.transport().request_count().await, 2);
    }

    #[tokio::test]
    async fn test_fetch_zero_ttl_bypasses_cache() {
        let transport = MockTransport::new();
        transport
            .respond("http://api/subject/1", json!({"title": "Alien"}))
            .await;

        let fetcher = fetcher(transport, 3);
        fetcher
            .fetch_json("http://api/subject/1", Duration::ZERO)
            .await
            .unwrap();
        fetcher
            .fetch_json("http://api/subject/1", Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(fetcher.transport().request_count().await, 2);
        assert!(fetcher.cache().is_empty().await);
    }

    #[test]
    fn test_not_found_not_retryable() {
        assert!(!FetchError::NotFound("x".to_string()).is_retryable());
        assert!(FetchError::Connection("refused".to_string()).is_retryable());
        assert!(FetchError::ApiError {
            status: 500,
            message: String::new()
        }
        .is_retryable());
    }
}
