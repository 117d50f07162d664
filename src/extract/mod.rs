//! Source-specific article extraction
//!
//! Each source family has one [`Extractor`] that knows where its listing
//! pages keep article titles, links, dates and images. Extractors are looked
//! up by source label in an [`ExtractorRegistry`]; supporting a new site means
//! registering a new extractor, not touching the existing ones.
//!
//! # Shipped extractors
//!
//! | Label | Extractor | Containers |
//! |-------|-----------|------------|
//! | `KYIVINDEPENDENT` | [`KyivIndependent`] | `article.tagCard` |
//! | `TASS` | [`Tass`] | `a.tass_pkg_card_wrapper-r-hZB` |
//! | `RIA` | [`RiaNovosti`] | `div.list-item` |
//! | `RU`, `UA`, `BY`, `PL`, `TR`, `CSTO` | [`CountryArticles`] | `article` |
//!
//! A malformed article block is logged and skipped; it never stops the rest
//! of the page from being extracted.

pub mod common;
mod country;
mod kyiv_independent;
mod ria;
mod tass;

pub use country::{CountryArticles, COUNTRY_CODES};
pub use kyiv_independent::KyivIndependent;
pub use ria::RiaNovosti;
pub use tass::Tass;

use crate::report::RawReport;
use crate::scrape::ParsedPage;
use crate::ExtractError;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Maps a fetched listing page to candidate reports
pub trait Extractor: Send + Sync {
    /// Configuration label selecting this extractor, e.g. `TASS`
    fn label(&self) -> &str;

    /// Name written into the `source` field of every report
    fn source_name(&self) -> &str;

    /// Extracts every article found on the page
    fn extract(&self, page: &ParsedPage) -> Extraction;
}

/// Reports extracted from one page, plus how many blocks were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub reports: Vec<RawReport>,
    pub skipped: usize,
}

impl Extraction {
    pub fn push(&mut self, report: RawReport) {
        self.reports.push(report);
    }

    /// Records a skipped article block
    pub fn skip(&mut self, page: &ParsedPage, error: &ExtractError) {
        tracing::warn!("Skipping article on {}: {}", page.url(), error);
        self.skipped += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }
}

/// Extractors keyed by upper-cased source label
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: BTreeMap<String, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an extractor under its label, replacing any previous one
    pub fn register(&mut self, extractor: impl Extractor + 'static) {
        self.extractors
            .insert(extractor.label().to_uppercase(), Arc::new(extractor));
    }

    /// Builder-style variant of [`ExtractorRegistry::register`]
    pub fn with(mut self, extractor: impl Extractor + 'static) -> Self {
        self.register(extractor);
        self
    }

    /// Looks up the extractor for a source label, ignoring case
    pub fn get(&self, label: &str) -> Option<Arc<dyn Extractor>> {
        self.extractors.get(&label.to_uppercase()).cloned()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.extractors.contains_key(&label.to_uppercase())
    }

    /// Registered labels, in sorted order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.extractors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractorRegistry")
            .field("labels", &self.extractors.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Registry holding every shipped extractor
pub fn default_registry() -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::new()
        .with(KyivIndependent)
        .with(Tass)
        .with(RiaNovosti);

    for code in COUNTRY_CODES {
        registry.register(CountryArticles::new(code));
    }

    registry
}
