use super::common::{
    compile, element_text, extract_blocks, parse_display_date, required_link, resolve_image_url,
    select_first, title_or_default,
};
use super::{Extraction, Extractor};
use crate::report::RawReport;
use crate::scrape::ParsedPage;
use crate::ExtractError;

const SOURCE_NAME: &str = "Kyiv Independent";

/// Tag listing pages of kyivindependent.com
#[derive(Debug, Clone, Copy, Default)]
pub struct KyivIndependent;

impl Extractor for KyivIndependent {
    fn label(&self) -> &str {
        "KYIVINDEPENDENT"
    }

    fn source_name(&self) -> &str {
        SOURCE_NAME
    }

    fn extract(&self, page: &ParsedPage) -> Extraction {
        let (Some(title_link), Some(time), Some(img)) = (
            compile("h2.tagCard__title a"),
            compile("time[datetime]"),
            compile("img"),
        ) else {
            return Extraction::default();
        };

        extract_blocks(page, "article.tagCard", |card| {
            let anchor =
                select_first(card, &title_link).ok_or_else(|| ExtractError::MissingElement {
                    source_name: SOURCE_NAME.to_string(),
                    element: "title link",
                })?;

            let date = select_first(card, &time)
                .and_then(|t| t.value().attr("datetime"))
                .and_then(parse_display_date);

            Ok(RawReport {
                title: title_or_default(&element_text(anchor)),
                link: required_link(anchor, page, SOURCE_NAME)?,
                date,
                source: SOURCE_NAME.to_string(),
                image_url: resolve_image_url(select_first(card, &img), page),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NO_TITLE;

    const LISTING: &str = r#"
        <html><body>
          <article class="tagCard">
            <img data-src="/images/front.jpg" src="/images/blur.jpg">
            <h2 class="tagCard__title"><a href="/news/front-line-update">Front line update</a></h2>
            <time datetime="2024-03-01T09:15:00+02:00">1 March</time>
          </article>
          <article class="tagCard">
            <h2 class="tagCard__title"><a href="https://kyivindependent.com/news/quiet"></a></h2>
            <time datetime="not a date">?</time>
          </article>
          <article class="tagCard">
            <h2 class="tagCard__title">Headline without a link</h2>
          </article>
        </body></html>
    "#;

    fn page() -> ParsedPage {
        ParsedPage::from_html("https://kyivindependent.com/tag/war/", LISTING).unwrap()
    }

    #[test]
    fn test_extracts_cards() {
        let extraction = KyivIndependent.extract(&page());

        assert_eq!(extraction.len(), 2);
        assert_eq!(extraction.skipped, 1);

        let first = &extraction.reports[0];
        assert_eq!(first.title, "Front line update");
        assert_eq!(first.link, "https://kyivindependent.com/news/front-line-update");
        assert_eq!(first.date.as_deref(), Some("March 01, 2024"));
        assert_eq!(first.source, "Kyiv Independent");
        assert_eq!(
            first.image_url.as_deref(),
            Some("https://kyivindependent.com/images/front.jpg")
        );
    }

    #[test]
    fn test_empty_anchor_and_bad_date() {
        let extraction = KyivIndependent.extract(&page());
        let second = &extraction.reports[1];

        assert_eq!(second.title, NO_TITLE);
        assert_eq!(second.link, "https://kyivindependent.com/news/quiet");
        assert_eq!(second.date, None);
        assert_eq!(second.image_url, None);
    }

    #[test]
    fn test_page_without_cards() {
        let page = ParsedPage::from_html("https://kyivindependent.com/", "<p>maintenance</p>")
            .unwrap();
        let extraction = KyivIndependent.extract(&page);
        assert!(extraction.is_empty());
        assert_eq!(extraction.skipped, 0);
    }
}
