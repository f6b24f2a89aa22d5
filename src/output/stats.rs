//! Terminal statistics for a site graph

use crate::model::NodeClass;
use crate::output::graph::SiteGraph;

/// Prints graph statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `graph` - The graph to summarize
pub fn print_statistics(graph: &SiteGraph) {
    print!("{}", format_statistics(graph));
}

/// Formats the statistics printed by [`print_statistics`]
pub fn format_statistics(graph: &SiteGraph) -> String {
    let mut out = String::from("=== Site Map Statistics ===\n\n");

    out.push_str("Nodes by Classification:\n");
    let total = graph.node_count();
    for class in NodeClass::all() {
        let count = graph.count(class);
        let percentage = if total > 0 {
            (count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        out.push_str(&format!("  {}: {} ({:.1}%)\n", class, count, percentage));
    }
    out.push_str(&format!("  Total: {}\n\n", total));
    out.push_str(&format!("Links: {}\n", graph.edge_count()));

    if let Some(run) = graph.runs().last() {
        out.push_str(&format!(
            "\nLast run {}: {} pages fetched, {} failed",
            run.outcome, run.pages_fetched, run.fetch_failures
        ));
        if let Some(ms) = run.duration_ms() {
            out.push_str(&format!(" in {:.2}s", ms as f64 / 1000.0));
        }
        out.push('\n');
    }

    out
}
