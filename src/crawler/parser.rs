//! HTML parser for extracting links and metadata
//!
//! This module reads a rendered document and extracts:
//! - The page title
//! - Every anchor `href` together with the anchor text
//!
//! Hrefs are returned exactly as written. Filtering and resolution against the document URL
//! happen in the engine, so a fetcher backed by a real browser can return the same shape.

use scraper::{Html, Selector};

/// A link as found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// The raw `href` attribute value
    pub href: String,

    /// The visible anchor text, whitespace-collapsed (None when empty)
    pub text: Option<String>,
}

impl PageLink {
    pub fn new(href: impl Into<String>, text: Option<&str>) -> Self {
        Self {
            href: href.into(),
            text: text.map(str::to_string),
        }
    }
}

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All anchors with an href, in document order
    pub links: Vec<PageLink>,
}

/// Parses HTML content and extracts the title and anchor hrefs
///
/// Anchors are extracted in document order, including `rel="nofollow"` anchors. Anchors
/// without an `href` attribute and anchors marked `download` are ignored.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
///
/// # Example
///
/// ```
/// use site_mapper::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links[0].href, "/page");
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Extracts every anchor href from the HTML document
fn extract_links(document: &Html) -> Vec<PageLink> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| {
            // Skip if it has the download attribute
            if element.value().attr("download").is_some() {
                return None;
            }

            let href = element.value().attr("href")?;
            let text = collapse_whitespace(&element.text().collect::<String>());
            let text = (!text.is_empty()).then_some(text);
            Some(PageLink {
                href: href.to_string(),
                text,
            })
        })
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
