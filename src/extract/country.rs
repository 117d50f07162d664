use super::common::{
    compile, element_text, extract_blocks, parse_display_date, required_link, resolve_image_url,
    select_first, title_or_default,
};
use super::{Extraction, Extractor};
use crate::report::RawReport;
use crate::scrape::ParsedPage;
use crate::ExtractError;

/// Country groups served by the generic article extractor
pub const COUNTRY_CODES: [&str; 6] = ["RU", "UA", "BY", "PL", "TR", "CSTO"];

/// Generic `<article>` listings grouped under a country code
///
/// The code itself is the report source, whatever site the page came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryArticles {
    code: String,
}

impl CountryArticles {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into().to_uppercase(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl Extractor for CountryArticles {
    fn label(&self) -> &str {
        &self.code
    }

    fn source_name(&self) -> &str {
        &self.code
    }

    fn extract(&self, page: &ParsedPage) -> Extraction {
        let (Some(link), Some(time), Some(img)) =
            (compile("a[href]"), compile("time[datetime]"), compile("img"))
        else {
            return Extraction::default();
        };

        extract_blocks(page, "article", |article| {
            let anchor = select_first(article, &link).ok_or_else(|| ExtractError::MissingElement {
                source_name: self.code.clone(),
                element: "link",
            })?;

            let date = select_first(article, &time)
                .and_then(|t| t.value().attr("datetime"))
                .and_then(parse_display_date);

            Ok(RawReport {
                title: title_or_default(&element_text(anchor)),
                link: required_link(anchor, page, &self.code)?,
                date,
                source: self.code.clone(),
                image_url: resolve_image_url(select_first(article, &img), page),
            })
        })
    }
}
