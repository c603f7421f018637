//! Douban movie API client.
//!
//! Endpoints (relative to the configured base URL):
//! - `search?q=<query>`
//! - `subject/<douban id>`
//! - `imdb/<imdb id>`

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::types::{Candidate, ExternalId, SearchResponse, SubjectRecord};
use super::{CatalogError, MovieCatalog};
use crate::config::Config;
use crate::fetch::{Fetcher, ResponseCache, ReqwestTransport, RetryPolicy, Transport};

/// Douban movie API client.
pub struct DoubanClient<T = ReqwestTransport> {
    fetcher: Fetcher<T>,
    base_url: String,
    api_key: Option<String>,
    search_ttl: Duration,
}

impl DoubanClient<ReqwestTransport> {
    /// Create a client that talks HTTP.
    pub fn new(config: &Config) -> Result<Self, CatalogError> {
        let transport = ReqwestTransport::new(&config.catalog)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> DoubanClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(config: &Config, transport: T) -> Self {
        let fetcher = Fetcher::new(
            transport,
            RetryPolicy::from(&config.retry),
            ResponseCache::new(config.cache.max_entries),
        );

        Self {
            fetcher,
            base_url: config.catalog.base_url.trim_end_matches('/').to_string(),
            api_key: config.catalog.api_key.clone().filter(|k| !k.is_empty()),
            search_ttl: Duration::from_secs(config.cache.search_ttl_secs),
        }
    }

    /// The fetcher used for all requests.
    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    /// URL for a free-text search.
    pub fn search_url(&self, query: &str) -> String {
        self.with_api_key(format!(
            "{}/search?q={}",
            self.base_url,
            urlencoding::encode(query)
        ))
    }

    /// URL for a subject lookup.
    pub fn subject_url(&self, id: &ExternalId) -> String {
        let url = match id {
            ExternalId::Imdb(imdb_id) => format!("{}/imdb/{}", self.base_url, imdb_id),
            ExternalId::Douban(douban_id) => format!("{}/subject/{}", self.base_url, douban_id),
        };
        self.with_api_key(url)
    }

    fn with_api_key(&self, url: String) -> String {
        match &self.api_key {
            Some(key) => {
                let separator = if url.contains('?') { '&' } else { '?' };
                format!("{}{}apikey={}", url, separator, urlencoding::encode(key))
            }
            None => url,
        }
    }

    async fn fetch<D: DeserializeOwned>(
        &self,
        url: &str,
        cache_ttl: Duration,
    ) -> Result<D, CatalogError> {
        let object = self
            .fetcher
            .fetch_json(url, cache_ttl)
            .await
            .ok_or_else(|| CatalogError::NoData(url.to_string()))?;

        serde_json::from_value(Value::Object(object))
            .map_err(|e| CatalogError::ParseError(format!("Unexpected payload from {}: {}", url, e)))
    }
}

#[async_trait]
impl<T: Transport> MovieCatalog for DoubanClient<T> {
    async fn search_movies(&self, query: &str) -> Result<Vec<Candidate>, CatalogError> {
        let url = self.search_url(query);

        debug!("Douban search: query='{}'", query);

        let response: SearchResponse = self.fetch(&url, self.search_ttl).await?;
        Ok(response.subjects)
    }

    async fn get_subject(
        &self,
        id: &ExternalId,
        cache_ttl: Duration,
    ) -> Result<SubjectRecord, CatalogError> {
        let url = self.subject_url(id);

        debug!("Douban get subject: id={}", id);

        self.fetch(&url, cache_ttl).await
    }
}
