//! Host-facing metadata agent.
//!
//! The host calls [`MetadataAgent::search`] to find candidate matches for a
//! media item, then [`MetadataAgent::update`] with the chosen result's id to
//! populate its metadata record.

pub mod mapper;
pub mod resolver;
pub mod scorer;
mod types;

pub use mapper::MetadataMapper;
pub use resolver::{resolve, strategy_for, Strategy, CERTAIN_SCORE};
pub use scorer::{score, score_candidates};
pub use types::*;

use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::external_catalog::{CatalogError, DoubanClient, ExternalId, MovieCatalog};
use crate::metrics;

/// Name the agent registers with the host.
pub const AGENT_NAME: &str = "Douban Movie Database";

/// Languages the agent serves metadata in.
pub const LANGUAGES: &[&str] = &["en", "zh"];

/// Result of an [`MetadataAgent::update`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record was populated.
    Updated,
    /// The identifier is neither an IMDb nor a Douban id.
    UnrecognizedId,
    /// The catalog returned nothing usable.
    NoData,
}

impl UpdateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::UnrecognizedId => "unrecognized_id",
            Self::NoData => "no_data",
        }
    }
}

/// Search and update entry points over a movie catalog.
pub struct MetadataAgent<C> {
    catalog: C,
    mapper: MetadataMapper,
    search_ttl: Duration,
    update_ttl: Duration,
}

impl MetadataAgent<DoubanClient> {
    /// Create an agent talking to the Douban API over HTTP.
    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        Ok(Self::new(DoubanClient::new(config)?, config))
    }
}

impl<C: MovieCatalog> MetadataAgent<C> {
    /// Create an agent over any catalog.
    pub fn new(catalog: C, config: &Config) -> Self {
        Self {
            catalog,
            mapper: MetadataMapper::new(config.agent.min_votes),
            search_ttl: Duration::from_secs(config.cache.search_ttl_secs),
            update_ttl: Duration::from_secs(config.cache.update_ttl_secs),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Find matches for `query`, best first.
    ///
    /// `manual` marks a user-initiated search, which allows the name to be
    /// an IMDb id. Failures yield an empty list.
    pub async fn search(&self, query: &Query, manual: bool) -> Vec<SearchResult> {
        let mut results = resolver::resolve(&self.catalog, query, manual, self.search_ttl).await;

        // Stable, so equal scores keep the catalog's order.
        results.sort_by(|a, b| b.score.cmp(&a.score));

        if let Some(best) = results.first() {
            metrics::BEST_MATCH_SCORE.observe(f64::from(best.score));
            info!(
                "Best match for '{}': {} ({}) score {}",
                query.name,
                best.id,
                best.name.as_deref().unwrap_or("-"),
                best.score
            );
        } else {
            info!("No match for '{}'", query.name);
        }

        results
    }

    /// Populate `target` from the subject identified by `identifier`.
    pub async fn update(&self, identifier: &str, target: &mut MetadataRecord) -> UpdateOutcome {
        let outcome = self.update_inner(identifier, target).await;
        metrics::UPDATES.with_label_values(&[outcome.as_str()]).inc();
        outcome
    }

    async fn update_inner(&self, identifier: &str, target: &mut MetadataRecord) -> UpdateOutcome {
        let Some(id) = ExternalId::parse(identifier) else {
            warn!("Cannot find douban id or imdb id in '{}'", identifier);
            return UpdateOutcome::UnrecognizedId;
        };

        let record = match self.catalog.get_subject(&id, self.update_ttl).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Failed to get data for {}: {}", id, e);
                return UpdateOutcome::NoData;
            }
        };

        self.mapper.map(&record, target);
        info!(
            "Updated metadata for {}: {}",
            id,
            target.title.as_deref().unwrap_or("-")
        );
        UpdateOutcome::Updated
    }
}
