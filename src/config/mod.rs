//! Configuration module for Report Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and building the source-to-URL mapping a run works from.
//!
//! # Example
//!
//! ```no_run
//! use report_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Concurrency: {}", config.scraper.max_concurrent_tasks);
//! ```

mod parser;
mod sources;
mod types;
mod validation;

// Re-export types
pub use sources::{env_var_name, parse_url_list, ScrapeTask, SourceConfig};
pub use types::{Config, FetcherConfig, OutputConfig, ScraperConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate_source_url;

impl Config {
    /// Source mapping as written in the `[sources]` table
    pub fn source_config(&self) -> SourceConfig {
        SourceConfig::from(&self.sources)
    }
}
