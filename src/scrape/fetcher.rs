//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building HTTP clients with the configured timeout
//! - Rotating the User-Agent header across a small pool
//! - Sending static Accept-Language and Referer headers
//! - Classifying failures into soft `FetchError`s
//!
//! Every fetch is a single attempt. A failed page is simply retried by the
//! next run.

use crate::config::FetcherConfig;
use crate::scrape::page::ParsedPage;
use crate::FetchError;
use rand::seq::IndexedRandom;
use reqwest::header::{ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Browser identifications used when no pool is configured
pub const DEFAULT_USER_AGENTS: [&str; 3] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Pool of User-Agent strings, one picked at random per request
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Vec<String>,
}

impl UserAgentPool {
    /// Creates a pool; an empty list falls back to [`DEFAULT_USER_AGENTS`]
    pub fn new(agents: Vec<String>) -> Self {
        if agents.is_empty() {
            return Self::default();
        }
        Self { agents }
    }

    pub fn agents(&self) -> &[String] {
        &self.agents
    }

    /// Picks a User-Agent for the next request
    pub fn choose(&self) -> &str {
        self.agents
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENTS[0])
    }
}

impl Default for UserAgentPool {
    fn default() -> Self {
        Self {
            agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.timeout_secs);

    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Issues listing-page requests
///
/// Holds an immutable client and header set, so one fetcher is shared by
/// every task of a run.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    user_agents: UserAgentPool,
    accept_language: String,
    referer: String,
}

impl Fetcher {
    pub fn new(
        client: Client,
        user_agents: UserAgentPool,
        accept_language: impl Into<String>,
        referer: impl Into<String>,
    ) -> Self {
        Self {
            client,
            user_agents,
            accept_language: accept_language.into(),
            referer: referer.into(),
        }
    }

    /// Builds a fetcher from configuration
    pub fn from_config(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(config)?,
            UserAgentPool::new(config.user_agents.clone()),
            config.accept_language.clone(),
            config.referer.clone(),
        ))
    }

    pub fn user_agents(&self) -> &UserAgentPool {
        &self.user_agents
    }

    /// Fetches a listing page
    ///
    /// # Error Classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | URL does not parse | `InvalidUrl` |
    /// | Request or body read times out | `Timeout` |
    /// | Connection refused, DNS or TLS failure | `Connect` |
    /// | Non-2xx status | `Status` |
    /// | Body cannot be decoded | `Body` |
    pub async fn fetch(&self, url: &str) -> Result<ParsedPage, FetchError> {
        let target = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let user_agent = self.user_agents.choose().to_string();
        tracing::debug!("GET {} as {}", url, user_agent);

        let response = self
            .client
            .get(target)
            .header(USER_AGENT, user_agent)
            .header(ACCEPT_LANGUAGE, self.accept_language.as_str())
            .header(REFERER, self.referer.as_str())
            .send()
            .await
            .map_err(|e| classify_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(ParsedPage::new(final_url, body))
    }
}

fn classify_error(url: &str, error: &reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: "connection refused".to_string(),
        }
    } else {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_fetcher(timeout_secs: u64, agents: Vec<String>) -> Fetcher {
        let config = FetcherConfig {
            timeout_secs,
            user_agents: agents,
            accept_language: "en-GB".to_string(),
            ..FetcherConfig::default()
        };
        Fetcher::from_config(&config).unwrap()
    }

    #[test]
    fn test_empty_pool_uses_defaults() {
        let pool = UserAgentPool::new(Vec::new());
        assert_eq!(pool.agents().len(), DEFAULT_USER_AGENTS.len());
        assert!(DEFAULT_USER_AGENTS.contains(&pool.choose()));
    }

    #[test]
    fn test_choose_stays_within_pool() {
        let pool = UserAgentPool::new(vec!["A/1".to_string(), "B/2".to_string()]);
        for _ in 0..50 {
            let ua = pool.choose();
            assert!(ua == "A/1" || ua == "B/2");
        }
    }

    #[tokio::test]
    async fn test_fetch_success_sends_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .and(header("user-agent", "TestAgent/1.0"))
            .and(header("accept-language", "en-GB"))
            .and(header("referer", "https://www.google.com/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = test_fetcher(5, vec!["TestAgent/1.0".to_string()]);
        let page = fetcher
            .fetch(&format!("{}/news", server.uri()))
            .await
            .unwrap();

        assert_eq!(page.body(), "<html>ok</html>");
        assert_eq!(page.url().path(), "/news");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = test_fetcher(5, Vec::new());
        let url = format!("{}/gone", server.uri());
        let err = fetcher.fetch(&url).await.unwrap_err();

        assert_eq!(
            err,
            FetchError::Status {
                url: url.clone(),
                status: 404
            }
        );
        assert_eq!(err.url(), url);
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let fetcher = test_fetcher(1, Vec::new());
        let err = fetcher.fetch(&format!("{}/slow", server.uri())).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let fetcher = test_fetcher(2, Vec::new());
        let err = fetcher.fetch("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, FetchError::Connect { .. }), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let fetcher = test_fetcher(2, Vec::new());
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
