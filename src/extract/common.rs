//! Helpers shared by the extractors: block iteration, text cleanup, date
//! formatting and lazy-image resolution.

use crate::extract::Extraction;
use crate::report::{RawReport, NO_TITLE};
use crate::scrape::ParsedPage;
use crate::ExtractError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use scraper::{ElementRef, Selector};

/// Image attributes in priority order; the first one present wins
pub const IMAGE_ATTRIBUTES: [&str; 4] = ["data-src", "data-lazy-src", "srcset", "src"];

/// Display format for report dates, e.g. `March 01, 2024`
pub const DISPLAY_DATE_FORMAT: &str = "%B %d, %Y";

/// Compiles a CSS selector, logging instead of panicking on a bad pattern
pub fn compile(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!("Invalid selector '{}': {:?}", css, e);
            None
        }
    }
}

/// Runs `per_block` over every element matching `container`
///
/// Blocks that return an error are logged and counted as skipped.
pub fn extract_blocks<F>(page: &ParsedPage, container: &str, per_block: F) -> Extraction
where
    F: Fn(ElementRef<'_>) -> Result<RawReport, ExtractError>,
{
    let mut extraction = Extraction::default();
    let Some(container) = compile(container) else {
        return extraction;
    };

    let document = page.document();
    for block in document.select(&container) {
        match per_block(block) {
            Ok(report) => extraction.push(report),
            Err(e) => extraction.skip(page, &e),
        }
    }

    extraction
}

/// First descendant of `element` matching `selector`
pub fn select_first<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element.select(selector).next()
}

/// Text content of an element with whitespace collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The given title, or [`NO_TITLE`] when it is blank
pub fn title_or_default(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        NO_TITLE.to_string()
    } else {
        title.to_string()
    }
}

/// Resolves an element's `href` against the page, or reports it missing
pub fn required_link(
    element: ElementRef<'_>,
    page: &ParsedPage,
    source_name: &str,
) -> Result<String, ExtractError> {
    let href = element
        .value()
        .attr("href")
        .ok_or_else(|| ExtractError::MissingElement {
            source_name: source_name.to_string(),
            element: "link",
        })?;

    page.resolve(href).ok_or_else(|| ExtractError::EmptyElement {
        source_name: source_name.to_string(),
        element: "link",
    })
}

/// Formats a date for display
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Today's date in display format, for sources without per-article dates
pub fn today_display() -> String {
    format_display_date(Utc::now().date_naive())
}

/// Converts a machine-readable timestamp to display format
///
/// Accepts `YYYY-MM-DD`, RFC 3339 and `YYYY-MM-DDTHH:MM:SS[.fff]` without an
/// offset. Anything else yields `None`.
///
/// # Example
///
/// ```
/// use report_harvester::extract::common::parse_display_date;
///
/// assert_eq!(parse_display_date("2024-03-01").as_deref(), Some("March 01, 2024"));
/// assert_eq!(parse_display_date("yesterday"), None);
/// ```
pub fn parse_display_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(format_display_date(date));
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(format_display_date(datetime.date_naive()));
    }

    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(format_display_date(datetime.date()));
    }

    None
}

/// Resolves an article image, honouring lazy-loading attributes
///
/// The attributes in [`IMAGE_ATTRIBUTES`] are checked in order and the first
/// one present is used; for `srcset` only the first candidate URL is taken.
/// Returns `None` when there is no image, no such attribute, or the value
/// does not resolve to an http(s) URL.
pub fn resolve_image_url(image: Option<ElementRef<'_>>, page: &ParsedPage) -> Option<String> {
    let image = image?;
    let (attr, value) = IMAGE_ATTRIBUTES
        .iter()
        .find_map(|attr| image.value().attr(attr).map(|value| (*attr, value)))?;

    let candidate = if attr == "srcset" {
        value.split_whitespace().next()?.trim_end_matches(',')
    } else {
        value
    };

    page.resolve(candidate)
}
