//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::{FetchError, Transport};
use crate::config::CatalogConfig;

/// HTTP transport sending plain GET requests.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with the configured timeout and user agent.
    pub fn new(config: &CatalogConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_secs)))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::ParseError(format!("Invalid JSON from {}: {}", url, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transport_from_default_config() {
        assert!(ReqwestTransport::new(&CatalogConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_error() {
        let config = CatalogConfig {
            timeout_secs: 1,
            ..Default::default()
        };
        let transport = ReqwestTransport::new(&config).unwrap();
        let result = transport.get_json("http://127.0.0.1:1/v2/movie/subject/1").await;
        assert!(matches!(result, Err(FetchError::HttpError(_))));
    }
}
