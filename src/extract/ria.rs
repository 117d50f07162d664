use super::common::{
    compile, element_text, extract_blocks, parse_display_date, required_link, resolve_image_url,
    select_first, title_or_default,
};
use super::{Extraction, Extractor};
use crate::report::RawReport;
use crate::scrape::ParsedPage;
use crate::ExtractError;

const SOURCE_NAME: &str = "RIA Novosti";

/// Section listings on ria.ru
///
/// The date is whatever the listing shows next to the item; it is only
/// reformatted when it happens to be machine-readable.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiaNovosti;

impl Extractor for RiaNovosti {
    fn label(&self) -> &str {
        "RIA"
    }

    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    fn extract(&self, page: &ParsedPage) -> Extraction {
        let (Some(title_link), Some(stamp), Some(img)) = (
            compile("a.list-item__title"),
            compile("div.list-item__date"),
            compile("img"),
        ) else {
            return Extraction::default();
        };

        extract_blocks(page, "div.list-item", |item| {
            let anchor =
                select_first(item, &title_link).ok_or_else(|| ExtractError::MissingElement {
                    source_name: SOURCE_NAME.to_string(),
                    element: "title link",
                })?;

            let date = select_first(item, &stamp)
                .map(element_text)
                .filter(|text| !text.is_empty())
                .map(|text| parse_display_date(&text).unwrap_or(text));

            Ok(RawReport {
                title: title_or_default(&element_text(anchor)),
                link: required_link(anchor, page, SOURCE_NAME)?,
                date,
                source: SOURCE_NAME.to_string(),
                image_url: resolve_image_url(select_first(item, &img), page),
            })
        })
    }
}
