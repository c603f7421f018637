use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Remote movie database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// API base URL, without trailing slash (default: https://api.douban.com/v2/movie)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Optional API key, sent as the `apikey` query parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.douban.com/v2/movie".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    concat!("doubanmeta/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Delay growth between fetch attempts
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Backoff {
    /// Same delay before every retry
    #[default]
    Fixed,
    /// Delay doubles after every failed attempt
    Exponential,
}

/// Retry policy for remote fetches
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Total attempts per fetch, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds (default: 5000)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default)]
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
            backoff: Backoff::default(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_delay_ms() -> u64 {
    5_000
}

/// Response cache lifetimes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// TTL for search and IMDb lookups in seconds (default: 3 hours)
    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,
    /// TTL for full metadata updates in seconds (default: 3 hours)
    #[serde(default = "default_update_ttl")]
    pub update_ttl_secs: u64,
    /// Maximum number of cached responses (default: 512)
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_ttl_secs: default_search_ttl(),
            update_ttl_secs: default_update_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_search_ttl() -> u64 {
    3 * 60 * 60
}

fn default_update_ttl() -> u64 {
    3 * 60 * 60
}

fn default_max_entries() -> usize {
    512
}

/// Matching and mapping behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    /// A rating is only applied when the vote count is strictly above this (default: 3)
    #[serde(default = "default_min_votes")]
    pub min_votes: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            min_votes: default_min_votes(),
        }
    }
}

fn default_min_votes() -> u64 {
    3
}

/// Sanitized config for logging (API key redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub catalog: SanitizedCatalogConfig,
    pub retry: RetryConfig,
    pub cache: CacheConfig,
    pub agent: AgentConfig,
}

/// Sanitized catalog config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
    pub user_agent: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            catalog: SanitizedCatalogConfig {
                base_url: config.catalog.base_url.clone(),
                api_key_configured: config
                    .catalog
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
                timeout_secs: config.catalog.timeout_secs,
                user_agent: config.catalog.user_agent.clone(),
            },
            retry: config.retry.clone(),
            cache: config.cache.clone(),
            agent: config.agent.clone(),
        }
    }
}
