//! Output module for consuming crawl events
//!
//! This module handles:
//! - Folding event streams into a de-duplicated site graph
//! - Generating markdown reports of the graph
//! - Printing graph statistics

mod graph;
mod markdown;
pub mod stats;

pub use graph::SiteGraph;
pub use markdown::{format_markdown_report, write_markdown_report};
pub use stats::{format_statistics, print_statistics};
