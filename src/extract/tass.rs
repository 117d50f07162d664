use super::common::{
    compile, element_text, extract_blocks, required_link, select_first, title_or_default,
    today_display,
};
use super::{Extraction, Extractor};
use crate::report::RawReport;
use crate::scrape::ParsedPage;
use crate::ExtractError;

const SOURCE_NAME: &str = "TASS";

/// Card listings on tass.com
///
/// Cards carry no usable publication date or image, so every report is
/// stamped with the extraction date and left to the placeholder image.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tass;

impl Extractor for Tass {
    fn label(&self) -> &str {
        "TASS"
    }

    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    fn extract(&self, page: &ParsedPage) -> Extraction {
        let Some(title) = compile("span.tass_pkg_title-xVUT1") else {
            return Extraction::default();
        };
        let today = today_display();

        extract_blocks(page, "a.tass_pkg_card_wrapper-r-hZB", |card| {
            let heading = select_first(card, &title).ok_or_else(|| ExtractError::MissingElement {
                source_name: SOURCE_NAME.to_string(),
                element: "title",
            })?;

            Ok(RawReport {
                title: title_or_default(&element_text(heading)),
                link: required_link(card, page, SOURCE_NAME)?,
                date: Some(today.clone()),
                source: SOURCE_NAME.to_string(),
                image_url: None,
            })
        })
    }
}
