//! Source label to URL-list mapping
//!
//! Sources come from the `[sources]` table of the config file and from
//! `<LABEL>_SITES` environment variables holding comma-separated URL lists.
//! An environment variable, when set to a non-empty list, replaces the file's
//! entry for that label. Its URLs are held to the same http(s) rule as the
//! file's.

use crate::config::validation::validate_source_url;
use crate::ConfigError;
use std::collections::BTreeMap;

/// One unit of scrape work: a single listing URL and the source it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeTask {
    /// Source label selecting the extractor
    pub source: String,

    /// Listing page to fetch
    pub url: String,

    /// Position of this URL within its source's list
    pub position: usize,
}

/// Mapping from source label to its listing URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceConfig {
    sources: BTreeMap<String, Vec<String>>,
}

impl SourceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the URL list for a label, dropping blank entries
    pub fn insert<I, S>(&mut self, label: &str, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = urls
            .into_iter()
            .map(|u| u.as_ref().trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        self.sources.insert(label.to_string(), urls);
    }

    /// Builder-style variant of [`SourceConfig::insert`]
    pub fn with_source<I, S>(mut self, label: &str, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.insert(label, urls);
        self
    }

    /// Overrides labels from `<LABEL>_SITES` process environment variables
    ///
    /// # Returns
    ///
    /// * `Ok(SourceConfig)` - File entries with every override applied
    /// * `Err(ConfigError::InvalidUrl)` - An override holds a non-http(s) URL
    pub fn with_env_overrides<'a>(
        self,
        labels: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ConfigError> {
        self.with_overrides_from(labels, |name| std::env::var(name).ok())
    }

    /// Overrides labels using an arbitrary variable lookup
    pub fn with_overrides_from<'a, F>(
        mut self,
        labels: impl IntoIterator<Item = &'a str>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for label in labels {
            let name = env_var_name(label);
            let Some(value) = lookup(&name) else {
                continue;
            };
            let urls = parse_url_list(&value);
            if urls.is_empty() {
                continue;
            }
            for url in &urls {
                validate_source_url(&name, url)?;
            }
            tracing::debug!("{} URLs for {} taken from environment", urls.len(), label);
            self.sources.insert(label.to_string(), urls);
        }
        Ok(self)
    }

    /// Configured labels, in sorted order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// URLs configured for a label
    pub fn urls(&self, label: &str) -> &[String] {
        self.sources.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Total number of tasks [`SourceConfig::expand`] will produce
    pub fn task_count(&self) -> usize {
        self.sources.values().map(Vec::len).sum()
    }

    /// Expands the mapping into one task per URL
    pub fn expand(&self) -> Vec<ScrapeTask> {
        self.sources
            .iter()
            .flat_map(|(label, urls)| {
                urls.iter().enumerate().map(move |(position, url)| ScrapeTask {
                    source: label.clone(),
                    url: url.clone(),
                    position,
                })
            })
            .collect()
    }
}

impl From<&BTreeMap<String, Vec<String>>> for SourceConfig {
    fn from(map: &BTreeMap<String, Vec<String>>) -> Self {
        let mut config = Self::new();
        for (label, urls) in map {
            config.insert(label, urls);
        }
        config
    }
}

/// Name of the environment variable holding a label's URL list
pub fn env_var_name(label: &str) -> String {
    format!("{}_SITES", label.to_uppercase())
}

/// Splits a comma-separated URL list, trimming entries and dropping empty ones
pub fn parse_url_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
