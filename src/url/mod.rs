//! URL handling module for Site-Mapper
//!
//! This module provides href filtering and resolution, domain extraction, and the
//! same-site test used to decide whether a discovered link belongs to the crawled site.

mod domain;
mod resolve;

// Re-export main functions
pub use domain::{domain_of, external_id, EXTERNAL_DOMAIN, EXTERNAL_ID_PREFIX};
pub use resolve::{parse_http_url, resolve, should_skip_href};

/// Checks whether a URL belongs to the crawled site
///
/// A URL is considered same-site when either:
/// 1. it starts with the literal seed URL string, or
/// 2. its host contains the root domain as a substring.
///
/// The second rule is a loose containment test, not host equality. A host such as
/// `example.com.mirror.net` (or `notexample.com`) is treated as same-site for a root domain of
/// `example.com`. Tightening this would change which pages a crawl reaches, so it is kept.
///
/// # Arguments
///
/// * `url` - The absolute URL to test
/// * `root_url` - The seed URL exactly as the crawl was started with
/// * `root_domain` - The seed's domain as returned by [`domain_of`]
///
/// # Examples
///
/// ```
/// use site_mapper::url::is_same_site;
///
/// assert!(is_same_site("https://example.com/docs", "https://example.com", "example.com"));
/// assert!(is_same_site("https://blog.example.com/", "https://example.com", "example.com"));
/// assert!(!is_same_site("https://other.org/", "https://example.com", "example.com"));
/// ```
pub fn is_same_site(url: &str, root_url: &str, root_domain: &str) -> bool {
    if url.starts_with(root_url) {
        return true;
    }

    if root_domain.is_empty() {
        return false;
    }

    match parse_http_url(url) {
        Ok(parsed) => parsed
            .host_str()
            .map(|host| host.contains(root_domain))
            .unwrap_or(false),
        Err(_) => false,
    }
}
