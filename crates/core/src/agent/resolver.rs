//! Query resolution.
//!
//! Decides how a query is looked up, in priority order:
//! 1. A primary identification pass already produced an IMDb id: trust it.
//! 2. A manual search whose name is an IMDb id: look that id up directly.
//! 3. Free-text search, scoring every movie entry.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::scorer;
use super::types::{Query, SearchResult};
use crate::external_catalog::{is_imdb_id, ExternalId, MovieCatalog};
use crate::metrics;

/// Score of a result that needs no matching.
pub const CERTAIN_SCORE: u32 = 100;

/// Lookup strategy chosen for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The query carries an IMDb id from a primary identification pass.
    PrimaryId,
    /// Manual search where the user typed an IMDb id.
    ManualImdb,
    /// Free-text title search.
    TextSearch,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryId => "primary_id",
            Self::ManualImdb => "manual_imdb",
            Self::TextSearch => "text_search",
        }
    }
}

/// Pick the strategy for `query`.
pub fn strategy_for(query: &Query, manual: bool) -> Strategy {
    if query
        .external_id
        .as_deref()
        .is_some_and(|id| is_imdb_id(id.trim()))
    {
        Strategy::PrimaryId
    } else if manual && is_imdb_id(query.name.trim()) {
        Strategy::ManualImdb
    } else {
        Strategy::TextSearch
    }
}

/// Resolve `query` to unsorted search results.
///
/// Never fails: lookup errors are logged and yield no results.
pub async fn resolve<C>(
    catalog: &C,
    query: &Query,
    manual: bool,
    lookup_ttl: Duration,
) -> Vec<SearchResult>
where
    C: MovieCatalog + ?Sized,
{
    let strategy = strategy_for(query, manual);
    metrics::RESOLVE_STRATEGY
        .with_label_values(&[strategy.as_str()])
        .inc();

    match strategy {
        Strategy::PrimaryId => {
            let id = query.external_id.as_deref().unwrap_or_default().trim();
            debug!("Using IMDb id {} from primary identification", id);
            vec![SearchResult {
                id: id.to_string(),
                name: None,
                year: None,
                score: CERTAIN_SCORE,
            }]
        }
        Strategy::ManualImdb => {
            let imdb_id = query.name.trim().to_string();
            match catalog
                .get_subject(&ExternalId::Imdb(imdb_id.clone()), lookup_ttl)
                .await
            {
                Ok(record) => vec![SearchResult {
                    id: imdb_id,
                    name: record.title,
                    year: record.year,
                    score: CERTAIN_SCORE,
                }],
                Err(e) => {
                    warn!("IMDb lookup for {} failed: {}", imdb_id, e);
                    Vec::new()
                }
            }
        }
        Strategy::TextSearch => search_by_title(catalog, query).await,
    }
}

async fn search_by_title<C>(catalog: &C, query: &Query) -> Vec<SearchResult>
where
    C: MovieCatalog + ?Sized,
{
    if query.name.trim().is_empty() {
        warn!("Skipping search for an empty title");
        return Vec::new();
    }

    let candidates = match catalog.search_movies(&query.name).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("Search for '{}' failed: {}", query.name, e);
            return Vec::new();
        }
    };

    metrics::SEARCH_CANDIDATES.observe(candidates.len() as f64);

    // Positions come from the full list, so filtering happens after scoring.
    let results: Vec<SearchResult> = scorer::score_candidates(&candidates, query)
        .into_iter()
        .filter(|scored| scored.candidate.is_movie() && !scored.candidate.id.is_empty())
        .map(SearchResult::from)
        .collect();

    info!(
        "Search for '{}' ({:?}): {} of {} entries are movies",
        query.name,
        query.year,
        results.len(),
        candidates.len()
    );

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external_catalog::DoubanClient;
    use crate::testing::fixtures::{self, query, BASE_URL};
    use crate::testing::MockTransport;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(60);

    fn client(transport: MockTransport) -> DoubanClient<MockTransport> {
        DoubanClient::with_transport(&fixtures::test_config(), transport)
    }

    #[test]
    fn test_strategy_priority() {
        let mut q = query("tt0078748", None);
        assert_eq!(strategy_for(&q, false), Strategy::TextSearch);
        assert_eq!(strategy_for(&q, true), Strategy::ManualImdb);

        q.external_id = Some("tt0078748".to_string());
        assert_eq!(strategy_for(&q, true), Strategy::PrimaryId);

        q.external_id = Some("1292052".to_string());
        assert_eq!(strategy_for(&q, false), Strategy::TextSearch);
    }

    #[tokio::test]
    async fn test_primary_id_short_circuits() {
        let transport = MockTransport::new();
        let catalog = client(transport.clone());

        let mut q = query("Alien", Some(1979));
        q.external_id = Some("tt0078748".to_string());

        let results = resolve(&catalog, &q, false, TTL).await;
        assert_eq!(
            results,
            vec![SearchResult {
                id: "tt0078748".to_string(),
                name: None,
                year: None,
                score: 100,
            }]
        );
        assert_eq!(transport.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_manual_imdb_lookup() {
        let transport = MockTransport::new();
        transport
            .respond(
                &format!("{}/imdb/tt0078748", BASE_URL),
                json!({"title": "异形", "year": ["1979"]}),
            )
            .await;
        let catalog = client(transport.clone());

        let results = resolve(&catalog, &query("tt0078748", None), true, TTL).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "tt0078748");
        assert_eq!(results[0].name.as_deref(), Some("异形"));
        assert_eq!(results[0].year, Some(1979));
        assert_eq!(transport.request_count().await, 1);
    }

    #[tokio::test]
    async fn test_manual_imdb_lookup_failure_is_empty() {
        let catalog = client(MockTransport::new());
        let results = resolve(&catalog, &query("tt0000000", None), true, TTL).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_text_search_filters_non_movies_but_keeps_positions() {
        let transport = MockTransport::new();
        transport
            .respond(
                &format!("{}/search?q=Alien", BASE_URL),
                fixtures::search_json(&[
                    fixtures::candidate_json("10", "Alien Nation", "1989", "tv"),
                    fixtures::candidate_json("11", "Alien", "1979", "movie"),
                    fixtures::candidate_json("12", "Aliens", "1986", "movie"),
                ]),
            )
            .await;
        let catalog = client(transport);

        let results = resolve(&catalog, &query("Alien", None), false, TTL).await;
        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["11", "12"]);
        // position 1: 90 - 0 - 5
        assert_eq!(results[0].score, 85);
        // position 2: 90 - 1 - 10
        assert_eq!(results[1].score, 79);
        assert_eq!(results[0].year, Some(1979));
    }

    #[tokio::test]
    async fn test_text_search_escapes_query() {
        let transport = MockTransport::new();
        let catalog = client(transport.clone());

        resolve(&catalog, &query("Lock, Stock & Two", None), false, TTL).await;

        let requests = transport.requests().await;
        assert_eq!(
            requests[0],
            format!("{}/search?q=Lock%2C%20Stock%20%26%20Two", BASE_URL)
        );
    }

    #[tokio::test]
    async fn test_text_search_failure_is_empty() {
        let transport = MockTransport::new();
        transport.fail_next(10).await;
        let catalog = client(transport.clone());

        let results = resolve(&catalog, &query("Alien", None), false, TTL).await;
        assert!(results.is_empty());
        assert_eq!(transport.request_count().await, 3);
    }

    #[tokio::test]
    async fn test_empty_title_does_not_search() {
        let transport = MockTransport::new();
        let catalog = client(transport.clone());

        assert!(resolve(&catalog, &query("  ", None), false, TTL)
            .await
            .is_empty());
        assert_eq!(transport.request_count().await, 0);
    }

    #[tokio::test]
    async fn test_text_search_drops_entries_without_id() {
        let transport = MockTransport::new();
        transport
            .respond(
                &format!("{}/search?q=Alien", BASE_URL),
                fixtures::search_json(&[
                    fixtures::candidate_json("", "Alien", "1979", "movie"),
                    fixtures::candidate_json("12", "Aliens", "1986", "movie"),
                ]),
            )
            .await;
        let catalog = client(transport);

        let results = resolve(&catalog, &query("Alien", None), false, TTL).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "12");
        // position 1: 90 - 1 - 5
        assert_eq!(results[0].score, 84);
    }
}
