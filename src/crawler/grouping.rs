//! List-item grouping heuristic
//!
//! Large repeated collections (product listings, tag pages, paginated records) would flood the
//! graph with near-identical nodes. The classifier maps such URLs onto their shared base path,
//! which becomes a single group node.
//!
//! # Known limitations
//!
//! This is a heuristic, not a pattern match:
//! - unrelated pages that happen to share a base path are grouped once the threshold is passed
//!   (for example top-level pages like `/about`, `/contact`, `/blog`, `/shop` all share `/`)
//! - list items with non-numeric last segments are treated as normal links until their base
//!   path has been observed more than [`GROUPING_THRESHOLD`] times
//! - every observation counts, so the same URL seen four times also trips the threshold

use std::collections::HashMap;
use url::{Position, Url};

/// Number of observations of a base path after which further matches are grouped
pub const GROUPING_THRESHOLD: u32 = 3;

/// Decides whether a same-site URL belongs to a repetitive list
#[derive(Debug, Clone, Default)]
pub struct GroupingClassifier {
    /// Observation count per base path
    counters: HashMap<String, u32>,
}

impl GroupingClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies a URL, returning the group base path when it should be collapsed
    ///
    /// 1. A purely numeric last segment (`/items/42`, `/items/42/`) groups immediately.
    /// 2. Otherwise the observation counter of the base path is incremented and the URL groups
    ///    once the counter exceeds [`GROUPING_THRESHOLD`].
    /// 3. URLs without a last segment (`https://example.com/`) never group.
    ///
    /// # Examples
    ///
    /// ```
    /// use site_mapper::crawler::GroupingClassifier;
    ///
    /// let mut classifier = GroupingClassifier::new();
    /// assert_eq!(
    ///     classifier.classify("https://shop.example/items/42"),
    ///     Some("https://shop.example/items/".to_string())
    /// );
    /// assert_eq!(classifier.classify("https://shop.example/"), None);
    /// ```
    pub fn classify(&mut self, url: &str) -> Option<String> {
        let (base_path, last_segment) = split_last_segment(url)?;

        if is_record_id(&last_segment) {
            return Some(base_path);
        }

        let count = self.counters.entry(base_path.clone()).or_insert(0);
        *count += 1;

        if *count > GROUPING_THRESHOLD {
            tracing::trace!("Grouping {} under {} (seen {} times)", url, base_path, count);
            Some(base_path)
        } else {
            None
        }
    }

    /// Returns how many times a base path has been observed
    pub fn observations(&self, base_path: &str) -> u32 {
        self.counters.get(base_path).copied().unwrap_or(0)
    }

    /// Forgets every observation
    pub fn reset(&mut self) {
        self.counters.clear();
    }
}

/// Splits a URL into its base path and last path segment
///
/// The base path is the URL up to and including the final `/` of its path; a single
/// trailing `/` stays with the last segment. Query and fragment are not part of either half.
///
/// Returns `None` when the URL cannot be parsed or its path has no segment to split off.
pub fn split_last_segment(url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(url).ok()?;
    if parsed.cannot_be_a_base() {
        return None;
    }

    let path = parsed.path();
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    let split_at = trimmed.rfind('/')?;

    let last_segment = &path[split_at + 1..];
    if last_segment.is_empty() || last_segment == "/" {
        return None;
    }

    let origin = &parsed[..Position::BeforePath];
    let base_path = format!("{}{}", origin, &path[..=split_at]);

    Some((base_path, last_segment.to_string()))
}

/// Returns true for segments made of digits only, optionally followed by one `/`
fn is_record_id(segment: &str) -> bool {
    let digits = segment.strip_suffix('/').unwrap_or(segment);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
