//! Douban movie metadata agent.
//!
//! Given a media title (or an IMDb / Douban id), searches the Douban movie
//! API, scores the candidates against the known title and year, and maps the
//! chosen subject onto a [`MetadataRecord`].

pub mod agent;
pub mod config;
pub mod external_catalog;
pub mod fetch;
pub mod metrics;
pub mod telemetry;
pub mod testing;

pub use agent::{
    MetadataAgent, MetadataMapper, MetadataRecord, Person, PosterProxy, Query, ScoredCandidate,
    SearchResult, Strategy, UpdateOutcome, AGENT_NAME, LANGUAGES,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AgentConfig, Backoff, CacheConfig,
    CatalogConfig, Config, ConfigError, RetryConfig, SanitizedConfig,
};
pub use external_catalog::{
    Candidate, CatalogError, DoubanClient, ExternalId, MovieCatalog, SubjectRecord,
};
pub use fetch::{
    FetchError, Fetcher, JsonObject, ResponseCache, ReqwestTransport, RetryPolicy, Transport,
};
pub use telemetry::{init_tracing, LogFormat};
