use crate::{UrlError, UrlResult};
use url::Url;

/// Parses an absolute URL and checks that it is a crawlable web address
///
/// Only `http` and `https` URLs with a host are accepted.
///
/// # Arguments
///
/// * `url_str` - The absolute URL string
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(UrlError)` - Malformed input, unsupported scheme or missing host
pub fn parse_http_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Returns true for hrefs that are discarded before any resolution is attempted
///
/// Empty hrefs, same-page anchors (`#...`) and script pseudo-links (`javascript...`, matched
/// case-sensitively) never produce a link.
pub fn should_skip_href(href: &str) -> bool {
    let href = href.trim();
    href.is_empty() || href.starts_with('#') || href.starts_with("javascript")
}

/// Resolves an href found on a page into an absolute, comparable URL
///
/// Resolution follows standard URL-reference rules (relative paths, `..` segments,
/// protocol-relative `//host/...` references, query-only references). The fragment is dropped
/// so two links to different anchors of one page compare equal.
///
/// Returns `None` when the link should be skipped:
/// - the href is filtered by [`should_skip_href`]
/// - the base or the resolved URL is malformed
/// - the resolved URL is not HTTP(S) (e.g. `mailto:`, `tel:`, `data:`)
///
/// # Examples
///
/// ```
/// use site_mapper::url::resolve;
///
/// assert_eq!(
///     resolve("https://example.com/a/b", "../c#top"),
///     Some("https://example.com/c".to_string())
/// );
/// assert_eq!(resolve("https://example.com/", "javascript:void(0)"), None);
/// ```
pub fn resolve(base: &str, href: &str) -> Option<String> {
    if should_skip_href(href) {
        return None;
    }

    let base_url = Url::parse(base).ok()?;
    let mut resolved = base_url.join(href.trim()).ok()?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }

    resolved.set_fragment(None);
    Some(resolved.to_string())
}
