//! Markdown report generation
//!
//! This module renders a [`SiteGraph`] as a human-readable markdown report: run information,
//! node counts per classification, the fetched pages, grouped lists and external domains.

use crate::model::{CrawlMode, NodeClass, RunSummary};
use crate::output::graph::SiteGraph;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Maximum number of rows listed per section
const SECTION_LIMIT: usize = 50;

/// Writes a markdown report of the graph to a file
///
/// # Arguments
///
/// * `graph` - The graph built from crawl events
/// * `output_path` - Path where the markdown file should be written
pub fn write_markdown_report(graph: &SiteGraph, output_path: &Path) -> crate::Result<()> {
    let markdown = format_markdown_report(graph);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats the graph as markdown
pub fn format_markdown_report(graph: &SiteGraph) -> String {
    let mut md = String::new();

    md.push_str("# Site Map Report\n\n");

    if !graph.runs().is_empty() {
        md.push_str("## Runs\n\n");
        md.push_str("| Mode | Outcome | Started | Duration | Pages | Failures |\n");
        md.push_str("|------|---------|---------|----------|-------|----------|\n");
        for run in graph.runs() {
            md.push_str(&format_run_row(run));
        }
        md.push('\n');
    }

    md.push_str("## Overview\n\n");
    md.push_str("| Classification | Nodes |\n");
    md.push_str("|----------------|-------|\n");
    for class in NodeClass::all() {
        md.push_str(&format!("| {} | {} |\n", class, graph.count(class)));
    }
    md.push_str(&format!("\n- **Total Nodes**: {}\n", graph.node_count()));
    md.push_str(&format!("- **Total Links**: {}\n\n", graph.edge_count()));

    push_section(&mut md, graph, NodeClass::Internal, "Pages");
    push_section(&mut md, graph, NodeClass::Pending, "Discovered, Not Fetched");
    push_section(&mut md, graph, NodeClass::Grouped, "Grouped Lists");
    push_section(&mut md, graph, NodeClass::External, "External Domains");

    md
}

fn format_run_row(run: &RunSummary) -> String {
    let mode = match run.mode {
        CrawlMode::FullCrawl { max_depth } => format!("crawl (depth {})", max_depth),
        CrawlMode::SinglePage => "scan".to_string(),
    };
    let duration = run
        .duration_ms()
        .map(|ms| format!("{:.2}s", ms as f64 / 1000.0))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "| {} | {} | {} | {} | {} | {} |\n",
        mode,
        run.outcome,
        run.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
        duration,
        run.pages_fetched,
        run.fetch_failures
    )
}

fn push_section(md: &mut String, graph: &SiteGraph, class: NodeClass, heading: &str) {
    let nodes: Vec<_> = graph
        .nodes()
        .iter()
        .filter(|node| node.class() == class)
        .collect();
    if nodes.is_empty() {
        return;
    }

    md.push_str(&format!("## {}\n\n", heading));
    md.push_str("| Title | Id | Outgoing Links |\n");
    md.push_str("|-------|----|----------------|\n");

    for node in nodes.iter().take(SECTION_LIMIT) {
        let id = node.id();
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(node.title()),
            id,
            graph.outgoing(&id).count()
        ));
    }

    if nodes.len() > SECTION_LIMIT {
        md.push_str(&format!(
            "\n... and {} more\n",
            nodes.len() - SECTION_LIMIT
        ));
    }
    md.push('\n');
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
