//! Data model for crawl results
//!
//! # Components
//!
//! - `SiteNode`/`NodeKind`: nodes of the site graph, identified by URL or synthetic id
//! - `Edge`: a directed "page links to target" observation
//! - `CrawlEvent`: the stream items delivered to consumers
//! - `RunSummary`: the terminal report of one run

mod event;
mod node;

// Re-export main types
pub use event::{CrawlEvent, CrawlMode, Edge, RunOutcome, RunSummary};
pub use node::{NodeClass, NodeKind, SiteNode};
