use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Report Harvester
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Source label -> listing page URLs
    #[serde(default)]
    pub sources: BTreeMap<String, Vec<String>>,
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// Per-request timeout (seconds)
    pub timeout_secs: u64,

    /// Static Accept-Language header value
    pub accept_language: String,

    /// Static Referer header value
    pub referer: String,

    /// User-Agent strings to rotate through; the built-in pool when empty
    #[serde(default)]
    pub user_agents: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            accept_language: "en-US,en;q=0.9".to_string(),
            referer: "https://www.google.com/".to_string(),
            user_agents: Vec::new(),
        }
    }
}

/// Orchestration configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// Maximum number of fetches in flight at once
    pub max_concurrent_tasks: u32,

    /// Lower bound of the delay between two URLs of the same source (milliseconds)
    pub politeness_min_ms: u64,

    /// Upper bound of the delay between two URLs of the same source (milliseconds)
    pub politeness_max_ms: u64,

    /// Overall run deadline (seconds); unbounded when absent
    #[serde(default)]
    pub run_deadline_secs: Option<u64>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 16,
            politeness_min_ms: 2000,
            politeness_max_ms: 5000,
            run_deadline_secs: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite report database
    pub database_path: String,

    /// Number of reports returned by a recency listing
    pub page_size: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./reports.db".to_string(),
            page_size: 100,
        }
    }
}
