//! Report Harvester: concurrent news-listing scraper
//!
//! This crate fetches article listings from a configured set of news sites,
//! extracts one record per article with a source-specific rule, fingerprints
//! each record and upserts it into a document store. Every configured URL is
//! scraped as an independent task so one failing site never affects another.

pub mod config;
pub mod extract;
pub mod fingerprint;
pub mod output;
pub mod report;
pub mod scrape;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Report Harvester operations
///
/// Only configuration problems and an unreachable store surface through this
/// type from a run; everything that happens inside a scrape task is folded
/// into that task's outcome instead.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("No extractor registered for source '{0}'")]
    UnknownSource(String),
}

/// Soft failure of a single page fetch
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

impl FetchError {
    /// The URL the failed request was made for
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::Connect { url, .. }
            | Self::Status { url, .. }
            | Self::Body { url, .. }
            | Self::InvalidUrl { url, .. } => url,
        }
    }
}

/// Soft failure of a single article block during extraction
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("{source_name}: article block is missing {element}")]
    MissingElement {
        source_name: String,
        element: &'static str,
    },

    #[error("{source_name}: article block has an empty {element}")]
    EmptyElement {
        source_name: String,
        element: &'static str,
    },
}

/// Result type alias for Report Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{load_config, Config, SourceConfig};
pub use extract::{default_registry, Extraction, Extractor, ExtractorRegistry};
pub use fingerprint::fingerprint;
pub use output::{FailedTask, RunSummary, SourceTally};
pub use report::{RawReport, StoredReport};
pub use scrape::{run_scrape, Fetcher, Orchestrator, ParsedPage};
pub use state::{TaskOutcome, TaskStage};
pub use storage::{ReportStore, SqliteReportStore, StorageError};
