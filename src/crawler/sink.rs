//! Event delivery to consumers
//!
//! The engine pushes [`CrawlEvent`]s into an [`EventSink`]. Two sinks are provided:
//! an unbounded Tokio channel sender, and [`CallbackSink`] wrapping three closures.

use crate::model::{CrawlEvent, Edge, RunSummary, SiteNode};
use tokio::sync::mpsc::UnboundedSender;

/// Receives the events of a run, in emission order
///
/// Implementations must not block: events are emitted from the traversal task.
pub trait EventSink: Send + Sync + 'static {
    fn emit(&self, event: CrawlEvent);
}

impl EventSink for UnboundedSender<CrawlEvent> {
    fn emit(&self, event: CrawlEvent) {
        if self.send(event).is_err() {
            tracing::trace!("Event receiver dropped, discarding event");
        }
    }
}

/// Sink dispatching to node, edge and finished callbacks
pub struct CallbackSink<N, E, F> {
    on_node: N,
    on_edge: E,
    on_finished: F,
}

impl<N, E, F> CallbackSink<N, E, F>
where
    N: Fn(SiteNode) + Send + Sync + 'static,
    E: Fn(Edge) + Send + Sync + 'static,
    F: Fn(RunSummary) + Send + Sync + 'static,
{
    pub fn new(on_node: N, on_edge: E, on_finished: F) -> Self {
        Self {
            on_node,
            on_edge,
            on_finished,
        }
    }
}

impl<N, E, F> EventSink for CallbackSink<N, E, F>
where
    N: Fn(SiteNode) + Send + Sync + 'static,
    E: Fn(Edge) + Send + Sync + 'static,
    F: Fn(RunSummary) + Send + Sync + 'static,
{
    fn emit(&self, event: CrawlEvent) {
        match event {
            CrawlEvent::Node(node) => (self.on_node)(node),
            CrawlEvent::Edge(edge) => (self.on_edge)(edge),
            CrawlEvent::Finished(summary) => (self.on_finished)(summary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CrawlMode;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    #[test]
    fn test_channel_sink() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.emit(CrawlEvent::Edge(Edge::new("a", "b")));
        assert!(matches!(rx.try_recv(), Ok(CrawlEvent::Edge(_))));
    }

    #[test]
    fn test_channel_sink_tolerates_dropped_receiver() {
        let (tx, rx) = mpsc::unbounded_channel::<CrawlEvent>();
        drop(rx);
        tx.emit(CrawlEvent::Edge(Edge::new("a", "b")));
    }

    #[test]
    fn test_callback_sink_dispatch() {
        let nodes = Arc::new(AtomicU32::new(0));
        let edges = Arc::new(AtomicU32::new(0));
        let finished = Arc::new(AtomicU32::new(0));

        let sink = {
            let (n, e, f) = (nodes.clone(), edges.clone(), finished.clone());
            CallbackSink::new(
                move |_| {
                    n.fetch_add(1, Ordering::SeqCst);
                },
                move |_| {
                    e.fetch_add(1, Ordering::SeqCst);
                },
                move |_| {
                    f.fetch_add(1, Ordering::SeqCst);
                },
            )
        };

        sink.emit(CrawlEvent::Node(SiteNode::external("other.org")));
        sink.emit(CrawlEvent::Edge(Edge::new("a", "b")));
        sink.emit(CrawlEvent::Edge(Edge::new("a", "c")));
        sink.emit(CrawlEvent::Finished(RunSummary::begin(CrawlMode::SinglePage)));

        assert_eq!(nodes.load(Ordering::SeqCst), 1);
        assert_eq!(edges.load(Ordering::SeqCst), 2);
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }
}
