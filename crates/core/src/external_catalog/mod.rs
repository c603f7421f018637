//! External movie catalog integration.
//!
//! This module provides the client for the Douban movie API, used to search
//! for candidate subjects and fetch full subject records.

mod douban;
mod types;

pub use douban::DoubanClient;
pub use types::*;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur when interacting with the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Every fetch attempt failed or returned a non-object payload.
    #[error("No data returned for {0}")]
    NoData(String),

    /// Payload was a JSON object but not the expected shape.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client could not be constructed.
    #[error("Client not configured: {0}")]
    NotConfigured(#[from] FetchError),
}

/// Trait for movie catalog clients.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Free-text search.
    ///
    /// Returns every entry the catalog produced, in its relevance order,
    /// including non-movie subtypes.
    async fn search_movies(&self, query: &str) -> Result<Vec<Candidate>, CatalogError>;

    /// Fetch a full subject record by IMDb or Douban id.
    async fn get_subject(
        &self,
        id: &ExternalId,
        cache_ttl: Duration,
    ) -> Result<SubjectRecord, CatalogError>;
}
