use super::node::SiteNode;
use crate::MapperError;
use chrono::{DateTime, Utc};
use std::fmt;

/// A directed link observation: page `from` links to `to`
///
/// Edges have no identity beyond the pair. The engine does not deduplicate them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Which operation produced a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Bounded breadth-first crawl from a seed
    FullCrawl { max_depth: u32 },

    /// One page expanded, no recursion
    SinglePage,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The frontier was drained
    Completed,

    /// `stop()` was requested before the frontier drained
    Stopped,

    /// The run could not start (bad seed, fetcher launch failure) or its task died
    Aborted,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Stopped => f.write_str("stopped"),
            Self::Aborted => f.write_str("aborted"),
        }
    }
}

/// Terminal report of one run, carried by [`CrawlEvent::Finished`]
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub mode: CrawlMode,
    pub outcome: RunOutcome,
    pub pages_fetched: u32,
    pub fetch_failures: u32,
    pub nodes_emitted: u32,
    pub edges_emitted: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    /// Starts a summary for a run beginning now
    pub fn begin(mode: CrawlMode) -> Self {
        Self {
            mode,
            outcome: RunOutcome::Aborted,
            pages_fetched: 0,
            fetch_failures: 0,
            nodes_emitted: 0,
            edges_emitted: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Records the outcome and the finish time
    pub fn finish(&mut self, outcome: RunOutcome) {
        self.outcome = outcome;
        self.finished_at = Some(Utc::now());
    }

    /// Fails with [`MapperError::RunAborted`] if the run never got going
    pub fn ensure_started(&self, target: &str) -> crate::Result<()> {
        if self.outcome == RunOutcome::Aborted {
            return Err(MapperError::RunAborted {
                target: target.to_string(),
            });
        }
        Ok(())
    }

    /// Returns the run duration in milliseconds, if the run has finished
    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds())
    }
}

/// An item of the event stream delivered to consumers
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    Node(SiteNode),
    Edge(Edge),
    Finished(RunSummary),
}

impl CrawlEvent {
    /// Returns true for the terminal event of a run
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}
