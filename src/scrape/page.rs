//! Fetched listing pages
//!
//! A `ParsedPage` keeps the final URL of a response alongside its body. The
//! HTML tree is built on demand by [`ParsedPage::document`] because
//! `scraper::Html` cannot be held across an await point in a spawned task;
//! extraction is synchronous and drops the tree before the task suspends again.

use scraper::Html;
use url::Url;

/// A listing page ready for extraction
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// URL the content was served from, used as base for relative links
    url: Url,

    /// Raw HTML body
    body: String,
}

impl ParsedPage {
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            url,
            body: body.into(),
        }
    }

    /// Builds a page from a URL string and HTML, mainly for fixtures
    ///
    /// # Example
    ///
    /// ```
    /// use report_harvester::ParsedPage;
    ///
    /// let page = ParsedPage::from_html("https://example.com/news/", "<html></html>").unwrap();
    /// assert_eq!(page.resolve("/a").as_deref(), Some("https://example.com/a"));
    /// ```
    pub fn from_html(url: &str, body: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(url)?, body))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the body into an HTML tree
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// Resolves an href against the page URL
    ///
    /// Returns None if the link should be excluded:
    /// - javascript:, mailto:, tel: schemes
    /// - data: URIs
    /// - fragment-only links
    /// - Invalid URLs
    /// - Non-HTTP(S) URLs after resolution
    pub fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();

        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        if href.starts_with("javascript:")
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with("data:")
        {
            return None;
        }

        match self.url.join(href) {
            Ok(absolute_url) => {
                if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                    Some(absolute_url.to_string())
                } else {
                    None
                }
            }
            Err(_) => None,
        }
    }
}
