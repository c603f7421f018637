//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Remote fetches (attempts, latency, give-ups, cache)
//! - Query resolution and scoring
//! - Metadata updates
//!
//! Nothing is registered globally; hosts add [`all_metrics`] to their own
//! registry.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Fetch Metrics
// =============================================================================

/// Fetch attempts total by result.
pub static FETCH_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("doubanmeta_fetch_attempts_total", "Total fetch attempts"),
        &["result"], // "success", "error", "not_object", "not_found"
    )
    .unwrap()
});

/// Fetch attempt duration in seconds.
pub static FETCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "doubanmeta_fetch_duration_seconds",
            "Duration of single fetch attempts",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["result"], // "success", "error"
    )
    .unwrap()
});

/// Fetches that gave up after exhausting the retry policy.
pub static FETCH_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "doubanmeta_fetch_failures_total",
        "Total fetches that returned no data",
    )
    .unwrap()
});

/// Response cache lookups by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "doubanmeta_cache_lookups_total",
            "Total response cache lookups",
        ),
        &["result"], // "hit", "miss"
    )
    .unwrap()
});

// =============================================================================
// Resolution Metrics
// =============================================================================

/// Searches by resolution strategy.
pub static RESOLVE_STRATEGY: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("doubanmeta_searches_total", "Total searches by strategy"),
        &["strategy"], // "primary_id", "manual_imdb", "text_search"
    )
    .unwrap()
});

/// Entries returned per free-text search.
pub static SEARCH_CANDIDATES: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "doubanmeta_search_candidates",
            "Number of entries returned per free-text search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0]),
    )
    .unwrap()
});

/// Best match scores.
pub static BEST_MATCH_SCORE: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "doubanmeta_best_match_score",
            "Distribution of best match scores",
        )
        .buckets(vec![10.0, 25.0, 50.0, 60.0, 70.0, 80.0, 85.0, 90.0, 95.0, 100.0]),
    )
    .unwrap()
});

// =============================================================================
// Update Metrics
// =============================================================================

/// Metadata updates by outcome.
pub static UPDATES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("doubanmeta_updates_total", "Total metadata updates"),
        &["outcome"], // "updated", "unrecognized_id", "no_data"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Fetch
        Box::new(FETCH_ATTEMPTS.clone()),
        Box::new(FETCH_DURATION.clone()),
        Box::new(FETCH_FAILURES.clone()),
        Box::new(CACHE_LOOKUPS.clone()),
        // Resolution
        Box::new(RESOLVE_STRATEGY.clone()),
        Box::new(SEARCH_CANDIDATES.clone()),
        Box::new(BEST_MATCH_SCORE.clone()),
        // Updates
        Box::new(UPDATES.clone()),
    ]
}
