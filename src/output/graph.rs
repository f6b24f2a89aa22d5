//! Consumer-side site graph
//!
//! Folds the event stream of one or more runs into a de-duplicated graph, the way a
//! visualization front end would.

use crate::model::{CrawlEvent, Edge, NodeClass, NodeKind, RunSummary, SiteNode};
use std::collections::{HashMap, HashSet};

/// A de-duplicated graph built from crawl events
///
/// Nodes are keyed by identity and keep their first-seen order. A later event for the same
/// identity replaces the stored node, except that a fetched (`Internal`) page is never
/// replaced by a `Pending` or `Grouped` node. Repeated edges are stored once.
#[derive(Debug, Clone, Default)]
pub struct SiteGraph {
    nodes: Vec<SiteNode>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
    edge_set: HashSet<Edge>,
    runs: Vec<RunSummary>,
}

impl SiteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event, returning true if it ended a run
    pub fn apply(&mut self, event: &CrawlEvent) -> bool {
        match event {
            CrawlEvent::Node(node) => {
                self.add_node(node.clone());
                false
            }
            CrawlEvent::Edge(edge) => {
                self.add_edge(edge.clone());
                false
            }
            CrawlEvent::Finished(summary) => {
                self.runs.push(summary.clone());
                true
            }
        }
    }

    /// Inserts or updates a node
    ///
    /// A fetched page is only ever replaced by a newer fetch of the same page; a group or
    /// pending node that shares its id leaves it in place.
    pub fn add_node(&mut self, node: SiteNode) {
        let id = node.id();
        match self.index.get(&id) {
            Some(&position) => {
                let existing = &mut self.nodes[position];
                if matches!(existing.kind(), NodeKind::Internal(_))
                    && !matches!(node.kind(), NodeKind::Internal(_))
                {
                    return;
                }
                *existing = node;
            }
            None => {
                self.index.insert(id, self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Inserts an edge, returning false if it was already present
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if !self.edge_set.insert(edge.clone()) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Looks up a node by URL or synthetic id
    pub fn node(&self, id: &str) -> Option<&SiteNode> {
        self.index.get(id).map(|&position| &self.nodes[position])
    }

    pub fn nodes(&self) -> &[SiteNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the edges leaving a node
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| edge.from == id)
    }

    /// Returns the number of nodes with the given classification
    pub fn count(&self, class: NodeClass) -> usize {
        self.nodes.iter().filter(|node| node.class() == class).count()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Summaries of the runs applied so far, oldest first
    pub fn runs(&self) -> &[RunSummary] {
        &self.runs
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CrawlMode, RunOutcome};

    #[test]
    fn test_nodes_deduplicated_by_identity() {
        let mut graph = SiteGraph::new();
        graph.add_node(SiteNode::external("other.org"));
        graph.add_node(SiteNode::external("other.org"));
        graph.add_node(SiteNode::grouped("https://example.com/items/"));

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.count(NodeClass::External), 1);
        assert_eq!(graph.count(NodeClass::Grouped), 1);
    }

    #[test]
    fn test_pending_upgraded_to_internal() {
        let mut graph = SiteGraph::new();
        graph.add_node(SiteNode::pending("https://example.com/docs", Some("Docs link")));
        graph.add_node(SiteNode::internal("https://example.com/docs", Some("Docs")));

        let node = graph.node("https://example.com/docs").unwrap();
        assert_eq!(node.class(), NodeClass::Internal);
        assert_eq!(node.title(), "Docs");
    }

    #[test]
    fn test_internal_never_downgraded() {
        let mut graph = SiteGraph::new();
        graph.add_node(SiteNode::internal("https://example.com/", Some("Home")));
        graph.add_node(SiteNode::pending("https://example.com/", Some("Back")));

        let node = graph.node("https://example.com/").unwrap();
        assert_eq!(node.class(), NodeClass::Internal);
        assert_eq!(node.title(), "Home");
    }

    #[test]
    fn test_internal_not_replaced_by_group() {
        let mut graph = SiteGraph::new();
        let events = vec![
            CrawlEvent::Node(SiteNode::internal("https://example.com/", Some("Home"))),
            CrawlEvent::Node(SiteNode::grouped("https://example.com/")),
            CrawlEvent::Edge(Edge::new("https://example.com/", "https://example.com/")),
            CrawlEvent::Node(SiteNode::internal("https://example.com/blog/", Some("Blog"))),
            CrawlEvent::Node(SiteNode::grouped("https://example.com/blog/")),
        ];
        for event in &events {
            graph.apply(event);
        }

        let root = graph.node("https://example.com/").unwrap();
        assert_eq!(root.class(), NodeClass::Internal);
        assert_eq!(root.title(), "Home");
        let blog = graph.node("https://example.com/blog/").unwrap();
        assert_eq!(blog.class(), NodeClass::Internal);
        assert_eq!(graph.count(NodeClass::Grouped), 0);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_group_replaced_by_fetched_page() {
        let mut graph = SiteGraph::new();
        graph.add_node(SiteNode::grouped("https://example.com/blog/"));
        graph.add_node(SiteNode::internal("https://example.com/blog/", Some("Blog")));

        let node = graph.node("https://example.com/blog/").unwrap();
        assert_eq!(node.class(), NodeClass::Internal);
    }

    #[test]
    fn test_insertion_order_kept() {
        let mut graph = SiteGraph::new();
        graph.add_node(SiteNode::internal("https://example.com/", None));
        graph.add_node(SiteNode::external("other.org"));
        graph.add_node(SiteNode::internal("https://example.com/", Some("Home")));

        let ids: Vec<String> = graph.nodes().iter().map(SiteNode::id).collect();
        assert_eq!(ids, vec!["https://example.com/", "ext://other.org"]);
    }

    #[test]
    fn test_duplicate_edges_collapsed() {
        let mut graph = SiteGraph::new();
        assert!(graph.add_edge(Edge::new("a", "b")));
        assert!(!graph.add_edge(Edge::new("a", "b")));
        assert!(graph.add_edge(Edge::new("b", "a")));

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.outgoing("a").count(), 1);
    }

    #[test]
    fn test_apply_events() {
        let mut graph = SiteGraph::new();
        let mut summary = RunSummary::begin(CrawlMode::FullCrawl { max_depth: 1 });
        summary.finish(RunOutcome::Completed);

        let events = vec![
            CrawlEvent::Node(SiteNode::internal("https://example.com/", Some("Home"))),
            CrawlEvent::Node(SiteNode::external("other.org")),
            CrawlEvent::Edge(Edge::new("https://example.com/", "ext://other.org")),
            CrawlEvent::Finished(summary),
        ];

        let finished: Vec<bool> = events.iter().map(|e| graph.apply(e)).collect();
        assert_eq!(finished, vec![false, false, false, true]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.runs().len(), 1);
        assert_eq!(graph.runs()[0].outcome, RunOutcome::Completed);
    }

    #[test]
    fn test_missing_node_lookup() {
        let graph = SiteGraph::new();
        assert!(graph.node("https://example.com/").is_none());
    }

    #[test]
    fn test_clear() {
        let mut graph = SiteGraph::new();
        graph.add_node(SiteNode::external("other.org"));
        graph.add_edge(Edge::new("a", "b"));
        graph.clear();

        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.node("ext://other.org").is_none());
    }
}
