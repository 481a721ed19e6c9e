//! HTML anchor extraction
//!
//! The engine only needs the raw `href` values of a page, in document
//! order. Resolution, filtering and scoping happen later in the URL module.

use scraper::{Html, Selector};

/// Extracts raw link targets from fetched page content
pub trait AnchorExtractor: Send + Sync {
    /// Returns the `href` values of all anchors, in document order
    ///
    /// Anchors without an `href` attribute are skipped.
    fn extract_hrefs(&self, html: &[u8]) -> Vec<String>;
}

/// [`AnchorExtractor`] backed by the `scraper` HTML parser
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlAnchorExtractor;

impl AnchorExtractor for HtmlAnchorExtractor {
    fn extract_hrefs(&self, html: &[u8]) -> Vec<String> {
        extract_hrefs(&String::from_utf8_lossy(html))
    }
}

/// Extracts the raw `href` of every `<a>` element in the document
///
/// # Example
///
/// ```
/// use link_spider::crawler::extract_hrefs;
///
/// let html = r#"<html><body><a href="/page">Link</a><a name="top"></a></body></html>"#;
/// assert_eq!(extract_hrefs(html), vec!["/page".to_string()]);
/// ```
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
