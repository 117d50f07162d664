//! Article records produced by extractors and persisted by the store

use crate::fingerprint::fingerprint;
use serde::Serialize;

/// Title used when an article block carries no readable title
pub const NO_TITLE: &str = "No title";

/// Date used when an article has no parseable date
pub const UNKNOWN_DATE: &str = "Unknown Date";

/// Image reference used when an article has no resolvable image
pub const PLACEHOLDER_IMAGE: &str = "/static/noimage.png";

/// A candidate article as found on a listing page
///
/// Lives only inside the task that extracted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReport {
    /// Article headline, never empty
    pub title: String,

    /// Absolute article URL
    pub link: String,

    /// Display-formatted date, if the page offered a usable one
    pub date: Option<String>,

    /// Name of the extractor variant that produced this record
    pub source: String,

    /// Absolute image URL, if one was found
    pub image_url: Option<String>,
}

impl RawReport {
    /// Stable identity of this article
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.title, &self.link)
    }
}

/// A report as persisted in the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredReport {
    /// Fingerprint of title and link; the document key
    pub id: String,
    pub title: String,
    pub link: String,
    pub date: String,
    pub source: String,
    pub image_url: String,
}

impl From<RawReport> for StoredReport {
    fn from(raw: RawReport) -> Self {
        let title = if raw.title.trim().is_empty() {
            NO_TITLE.to_string()
        } else {
            raw.title
        };
        // Fingerprint the title as stored, after the default is applied
        let id = fingerprint(&title, &raw.link);

        Self {
            id,
            title,
            link: raw.link,
            date: raw
                .date
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            source: raw.source,
            image_url: raw
                .image_url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        }
    }
}
