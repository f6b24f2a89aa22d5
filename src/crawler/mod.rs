//! Crawler module for site traversal and link classification
//!
//! This module contains the core crawling logic, including:
//! - The page fetcher abstraction and its HTTP implementation
//! - HTML parsing and link extraction
//! - Frontier and visited-set management
//! - The list-item grouping heuristic
//! - The engine that runs full crawls and single-page scans

mod engine;
mod fetcher;
mod frontier;
mod grouping;
mod parser;
mod sink;

pub use engine::{CrawlEngine, EngineState};
pub use fetcher::{
    build_http_client, FetchError, FetchedPage, FetcherLauncher, HttpLauncher, HttpSession,
    PageSession, MAX_REDIRECTS,
};
pub use frontier::{CrawlTask, Frontier, FrontierPolicy, TraversalState, VisitedSet};
pub use grouping::{split_last_segment, GroupingClassifier, GROUPING_THRESHOLD};
pub use parser::{parse_html, PageLink, ParsedPage};
pub use sink::{CallbackSink, EventSink};
