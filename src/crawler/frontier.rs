//! Frontier and visited-set management
//!
//! This module handles:
//! - The FIFO queue of pages waiting to be fetched
//! - The at-most-once guarantee via the visited set
//! - The policy that distinguishes a bounded crawl from a single-page scan

use super::grouping::GroupingClassifier;
use crate::model::CrawlMode;
use std::collections::{HashSet, VecDeque};

/// A page queued for fetching together with its hop distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Absolute URL (identity)
    pub url: String,

    /// Number of link hops from the seed
    pub depth: u32,
}

impl CrawlTask {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }

    /// Creates the task for a run's starting page
    pub fn seed(url: impl Into<String>) -> Self {
        Self::new(url, 0)
    }
}

/// First-in first-out queue of tasks
///
/// Draining it in order yields pages in non-decreasing depth, which is what makes the traversal
/// breadth-first. Duplicate URLs may be queued; the visited set filters them on dequeue.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<CrawlTask>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: CrawlTask) {
        self.queue.push_back(task);
    }

    pub fn pop(&mut self) -> Option<CrawlTask> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// URLs already dequeued for fetching
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL visited, returning false if it already was
    pub fn try_visit(&mut self, url: &str) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn clear(&mut self) {
        self.urls.clear();
    }
}

/// State shared across the pages of a run
///
/// A full crawl resets it at start. Single-page scans keep accumulating into it until the next
/// full crawl.
#[derive(Debug, Default)]
pub struct TraversalState {
    pub visited: VisitedSet,
    pub grouping: GroupingClassifier,
}

impl TraversalState {
    pub fn reset(&mut self) {
        self.visited.clear();
        self.grouping.reset();
    }
}

/// How the traversal treats the links of a fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontierPolicy {
    /// Same-site links are queued one hop deeper, up to `max_depth`
    Bounded { max_depth: u32 },

    /// Only the starting page is fetched; same-site links become pending nodes
    SinglePage,
}

impl FrontierPolicy {
    /// Returns true when the links of a page at `depth` should be processed
    ///
    /// # Examples
    ///
    /// ```
    /// use site_mapper::crawler::FrontierPolicy;
    ///
    /// let policy = FrontierPolicy::Bounded { max_depth: 1 };
    /// assert!(policy.follows_links(0));
    /// assert!(!policy.follows_links(1));
    /// ```
    pub fn follows_links(&self, depth: u32) -> bool {
        match self {
            Self::Bounded { max_depth } => depth < *max_depth,
            Self::SinglePage => true,
        }
    }

    /// Returns true when same-site links are queued for fetching
    pub fn enqueues_links(&self) -> bool {
        matches!(self, Self::Bounded { .. })
    }

    /// Returns true when links back to the page itself are dropped
    pub fn suppresses_self_links(&self) -> bool {
        matches!(self, Self::SinglePage)
    }

    pub fn mode(&self) -> CrawlMode {
        match self {
            Self::Bounded { max_depth } => CrawlMode::FullCrawl {
                max_depth: *max_depth,
            },
            Self::SinglePage => CrawlMode::SinglePage,
        }
    }
}
