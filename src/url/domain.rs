use super::resolve::parse_http_url;

/// Domain returned when a URL cannot be parsed or has no host
pub const EXTERNAL_DOMAIN: &str = "External";

/// Prefix used to build the identity of external-domain nodes
pub const EXTERNAL_ID_PREFIX: &str = "ext://";

/// Extracts the display domain from a URL
///
/// The host is lowercased and a single leading `www.` label is removed. Parse failures never
/// propagate: any URL without a usable host yields [`EXTERNAL_DOMAIN`].
///
/// # Examples
///
/// ```
/// use site_mapper::url::domain_of;
///
/// assert_eq!(domain_of("https://www.example.com/path"), "example.com");
/// assert_eq!(domain_of("https://Blog.Example.com/"), "blog.example.com");
/// assert_eq!(domain_of("not a url"), "External");
/// ```
pub fn domain_of(url: &str) -> String {
    let host = match parse_http_url(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.to_string(),
            None => return EXTERNAL_DOMAIN.to_string(),
        },
        Err(_) => return EXTERNAL_DOMAIN.to_string(),
    };

    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

/// Builds the synthetic identity for an external domain node
pub fn external_id(domain: &str) -> String {
    format!("{}{}", EXTERNAL_ID_PREFIX, domain)
}
