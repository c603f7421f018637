//! Mock transport for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::fetch::{FetchError, Transport};

/// Mock implementation of the Transport trait.
///
/// Provides controllable behavior for testing:
/// - Return configured JSON bodies per URL (unknown URLs are 404)
/// - Track requested URLs for assertions
/// - Simulate connection failures
///
/// Clones share state, so a test can keep a handle after moving one into
/// a client.
///
/// # Example
///
/// ```rust,ignore
/// use doubanmeta_core::testing::{MockTransport, fixtures};
///
/// let transport = MockTransport::new();
/// transport.respond("http://api/subject/1", fixtures::subject_json("Alien", "1979")).await;
/// transport.fail_next(2).await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    /// Response bodies by URL.
    responses: Arc<RwLock<HashMap<String, Value>>>,
    /// Requested URLs, in order.
    requests: Arc<RwLock<Vec<String>>>,
    /// Number of upcoming requests that fail with a connection error.
    failures_remaining: Arc<RwLock<u32>>,
}

impl MockTransport {
    /// Create a new mock transport with no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub async fn respond(&self, url: &str, body: Value) {
        self.responses.write().await.insert(url.to_string(), body);
    }

    /// Stop serving `url`.
    pub async fn remove(&self, url: &str) {
        self.responses.write().await.remove(url);
    }

    /// Fail the next `count` requests with a connection error.
    pub async fn fail_next(&self, count: u32) {
        *self.failures_remaining.write().await = count;
    }

    /// Get all requested URLs.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Get the number of requests performed.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Clear recorded requests.
    pub async fn clear_recorded(&self) {
        self.requests.write().await.clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.requests.write().await.push(url.to_string());

        {
            let mut failures = self.failures_remaining.write().await;
            if *failures > 0 {
                *failures -= 1;
                return Err(FetchError::Connection(format!("simulated failure for {}", url)));
            }
        }

        self.responses
            .read()
            .await
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}
