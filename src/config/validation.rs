use crate::config::types::{Config, FetcherConfig, OutputConfig, ScraperConfig};
use crate::ConfigError;
use std::collections::BTreeMap;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_scraper_config(&config.scraper)?;
    validate_output_config(&config.output)?;
    validate_sources(&config.sources)?;
    Ok(())
}

fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 || config.timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 120, got {}",
            config.timeout_secs
        )));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_tasks < 1 || config.max_concurrent_tasks > 256 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_tasks must be between 1 and 256, got {}",
            config.max_concurrent_tasks
        )));
    }

    if config.politeness_min_ms > config.politeness_max_ms {
        return Err(ConfigError::Validation(format!(
            "politeness_min_ms ({}) cannot exceed politeness_max_ms ({})",
            config.politeness_min_ms, config.politeness_max_ms
        )));
    }

    if config.run_deadline_secs == Some(0) {
        return Err(ConfigError::Validation(
            "run_deadline_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.page_size < 1 {
        return Err(ConfigError::Validation(
            "page_size must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_sources(sources: &BTreeMap<String, Vec<String>>) -> Result<(), ConfigError> {
    for (label, urls) in sources {
        if label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source labels cannot be empty".to_string(),
            ));
        }

        for url in urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
            validate_source_url(label, url)?;
        }
    }

    Ok(())
}

/// Checks that a configured listing URL is absolute http(s)
pub fn validate_source_url(label: &str, url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(url)
        .map_err(|e| ConfigError::InvalidUrl(format!("{} ({}): {}", url, label, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl(format!(
            "{} ({}): unsupported scheme '{}'",
            url, label, other
        ))),
    }
}
