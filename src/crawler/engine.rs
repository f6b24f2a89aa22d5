//! Crawl engine - run lifecycle and traversal
//!
//! This module contains the traversal loop shared by both operations and the machinery
//! around it:
//! - Starting a run on a background task, superseding any run still in progress
//! - Cooperative cancellation through a per-run flag
//! - Owning the page session (per run for full crawls, held across single-page scans)
//! - Link classification into internal, external, grouped and pending targets
//! - Emitting node and edge events, and exactly one `Finished` event per run

use super::fetcher::{FetchError, FetchedPage, FetcherLauncher, PageSession};
use super::frontier::{CrawlTask, Frontier, FrontierPolicy, TraversalState};
use super::sink::EventSink;
use crate::model::{CrawlEvent, CrawlMode, Edge, RunOutcome, RunSummary, SiteNode};
use crate::url::{domain_of, is_same_site, parse_http_url, resolve};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

type SessionSlot = tokio::sync::Mutex<Option<Box<dyn PageSession>>>;

/// Lifecycle state of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// No run has started, or resources were cleaned up
    #[default]
    Idle,

    /// A run is in progress
    Running,

    /// The last run ended on its own (drained, or could not start)
    Finished,

    /// The last run was stopped before draining
    Stopped,
}

/// Handle to a spawned run
struct ActiveRun {
    mode: CrawlMode,
    running: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct RunSlot {
    /// Incremented for every run; a finishing run only updates state if it is still current
    generation: u64,
    state: EngineState,
    active: Option<ActiveRun>,
}

struct Shared {
    traversal: Mutex<TraversalState>,
    session: SessionSlot,
    slot: Mutex<RunSlot>,
}

impl Shared {
    fn settle(&self, generation: u64, outcome: RunOutcome) {
        let mut slot = lock(&self.slot);
        if slot.generation == generation {
            slot.state = match outcome {
                RunOutcome::Stopped => EngineState::Stopped,
                RunOutcome::Completed | RunOutcome::Aborted => EngineState::Finished,
            };
        }
    }
}

/// Explores a site and streams what it finds
///
/// Two operations are offered:
/// - [`start_crawling`](Self::start_crawling): bounded breadth-first crawl from a seed
/// - [`crawl_single_page`](Self::crawl_single_page): fetch one page and report its links
///   without following them
///
/// Both return immediately; the run proceeds on a Tokio task and reports through the given
/// [`EventSink`]. Every run ends with exactly one [`CrawlEvent::Finished`]. Only one run is
/// active at a time: starting a run stops the previous one and waits for it to wind down first.
///
/// The visited set and grouping counters are reset by each full crawl and accumulate across
/// single-page scans, so a page already fetched in this session is not fetched again by a scan.
///
/// # Example
///
/// ```no_run
/// use site_mapper::{CrawlEngine, Config, CrawlEvent, HttpLauncher};
/// use tokio::sync::mpsc;
///
/// # async fn example() {
/// let engine = CrawlEngine::new(HttpLauncher::new(&Config::default()));
/// let (tx, mut rx) = mpsc::unbounded_channel();
/// engine.start_crawling("https://example.com/", 2, tx);
///
/// while let Some(event) = rx.recv().await {
///     if let CrawlEvent::Finished(summary) = event {
///         println!("{} pages", summary.pages_fetched);
///         break;
///     }
/// }
/// engine.cleanup().await;
/// # }
/// ```
pub struct CrawlEngine {
    launcher: Arc<dyn FetcherLauncher>,
    shared: Arc<Shared>,
}

impl CrawlEngine {
    pub fn new(launcher: impl FetcherLauncher) -> Self {
        Self {
            launcher: Arc::new(launcher),
            shared: Arc::new(Shared {
                traversal: Mutex::new(TraversalState::default()),
                session: tokio::sync::Mutex::new(None),
                slot: Mutex::new(RunSlot::default()),
            }),
        }
    }

    /// Starts a bounded breadth-first crawl from `seed`
    ///
    /// Pages up to `max_depth` link hops from the seed are fetched; the links of pages at
    /// `max_depth` are not examined. A seed that is not an absolute HTTP(S) URL ends the run
    /// immediately with [`RunOutcome::Aborted`].
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_crawling(&self, seed: &str, max_depth: u32, sink: impl EventSink) {
        self.start_run(FrontierPolicy::Bounded { max_depth }, seed, Arc::new(sink));
    }

    /// Fetches one page and reports its links without following them
    ///
    /// Same-site links are reported as pending nodes titled with their anchor text. The page
    /// session is kept open afterwards so subsequent scans reuse it.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn crawl_single_page(&self, url: &str, sink: impl EventSink) {
        self.start_run(FrontierPolicy::SinglePage, url, Arc::new(sink));
    }

    /// Requests cancellation of the active run
    ///
    /// The run stops at its next checkpoint and still emits `Finished`. In single-page mode the
    /// held page session is released as well. Calling this with no active run does nothing.
    pub async fn stop(&self) {
        let mode = {
            let slot = lock(&self.shared.slot);
            slot.active.as_ref().map(|run| {
                run.running.store(false, Ordering::SeqCst);
                run.mode
            })
        };

        match mode {
            Some(CrawlMode::SinglePage) => {
                tracing::info!("Stop requested, releasing page session");
                release_session(&self.shared.session).await;
            }
            Some(CrawlMode::FullCrawl { .. }) => tracing::info!("Stop requested"),
            None => {}
        }
    }

    /// Stops any active run, waits for it, and releases the held page session
    ///
    /// Afterwards the engine is [`EngineState::Idle`].
    pub async fn cleanup(&self) {
        let active = lock(&self.shared.slot).active.take();
        if let Some(run) = active {
            run.running.store(false, Ordering::SeqCst);
            if let Err(e) = run.task.await {
                tracing::warn!("Crawl task ended abnormally: {}", e);
            }
        }

        release_session(&self.shared.session).await;

        let mut slot = lock(&self.shared.slot);
        if slot.active.is_none() {
            slot.state = EngineState::Idle;
        }
    }

    pub fn state(&self) -> EngineState {
        lock(&self.shared.slot).state
    }

    pub fn is_running(&self) -> bool {
        self.state() == EngineState::Running
    }

    fn start_run(&self, policy: FrontierPolicy, target: &str, sink: Arc<dyn EventSink>) {
        let running = Arc::new(AtomicBool::new(true));
        let mut slot = lock(&self.shared.slot);

        let previous = slot.active.take();
        if let Some(run) = &previous {
            run.running.store(false, Ordering::SeqCst);
        }

        slot.generation += 1;
        slot.state = EngineState::Running;

        let run = RunContext {
            launcher: self.launcher.clone(),
            shared: self.shared.clone(),
            policy,
            target: target.to_string(),
            running: running.clone(),
            generation: slot.generation,
        };
        let task = tokio::spawn(run.execute(previous, sink));

        slot.active = Some(ActiveRun {
            mode: policy.mode(),
            running,
            task,
        });
    }
}

impl Drop for CrawlEngine {
    fn drop(&mut self) {
        if let Some(run) = &lock(&self.shared.slot).active {
            run.running.store(false, Ordering::SeqCst);
        }
    }
}

/// Everything a spawned run needs
struct RunContext {
    launcher: Arc<dyn FetcherLauncher>,
    shared: Arc<Shared>,
    policy: FrontierPolicy,
    /// The URL exactly as given by the caller; the prefix part of the same-site test uses it
    target: String,
    running: Arc<AtomicBool>,
    generation: u64,
}

impl RunContext {
    async fn execute(self, previous: Option<ActiveRun>, sink: Arc<dyn EventSink>) {
        let mut emitter = RunEmitter::new(
            sink,
            self.policy.mode(),
            self.shared.clone(),
            self.generation,
        );

        if let Some(previous) = previous {
            if let Err(e) = previous.task.await {
                tracing::warn!("Previous crawl task ended abnormally: {}", e);
            }
        }

        let outcome = match self.policy {
            FrontierPolicy::Bounded { max_depth } => {
                // A full crawl does not share the scan session
                release_session(&self.shared.session).await;
                self.run_full_crawl(max_depth, &mut emitter).await
            }
            FrontierPolicy::SinglePage => self.run_single_page(&mut emitter).await,
        };

        emitter.finish(outcome);
    }

    async fn run_full_crawl(&self, max_depth: u32, emitter: &mut RunEmitter) -> RunOutcome {
        let seed = match parse_http_url(&self.target) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::error!("Invalid seed URL '{}': {}", self.target, e);
                return RunOutcome::Aborted;
            }
        };

        lock(&self.shared.traversal).reset();
        tracing::info!("Starting crawl of {} (max depth {})", seed, max_depth);

        let session = match self.launcher.launch().await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("{}", e);
                return RunOutcome::Aborted;
            }
        };

        let slot: SessionSlot = tokio::sync::Mutex::new(Some(session));
        let outcome = self.traverse(&slot, CrawlTask::seed(seed), emitter).await;
        release_session(&slot).await;

        outcome
    }

    async fn run_single_page(&self, emitter: &mut RunEmitter) -> RunOutcome {
        let page = match parse_http_url(&self.target) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::error!("Invalid page URL '{}': {}", self.target, e);
                return RunOutcome::Aborted;
            }
        };

        if !self.is_running() {
            return RunOutcome::Stopped;
        }

        {
            let mut session = self.shared.session.lock().await;
            if session.is_none() {
                match self.launcher.launch().await {
                    Ok(launched) => *session = Some(launched),
                    Err(e) => {
                        tracing::error!("{}", e);
                        return RunOutcome::Aborted;
                    }
                }
            }
        }

        tracing::info!("Scanning {}", page);
        self.traverse(&self.shared.session, CrawlTask::seed(page), emitter)
            .await
    }

    /// Drains the frontier, fetching each page at most once
    async fn traverse(
        &self,
        session: &SessionSlot,
        seed: CrawlTask,
        emitter: &mut RunEmitter,
    ) -> RunOutcome {
        let root_domain = domain_of(&self.target);
        let mut frontier = Frontier::new();
        frontier.push(seed);

        loop {
            if !self.is_running() {
                return RunOutcome::Stopped;
            }

            let Some(task) = frontier.pop() else {
                return RunOutcome::Completed;
            };

            let first_visit = lock(&self.shared.traversal).visited.try_visit(&task.url);
            if !first_visit {
                tracing::debug!("Already visited {}", task.url);
                continue;
            }

            tracing::debug!("Fetching {} (depth {})", task.url, task.depth);
            let page = match navigate(session, &task.url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", task.url, e);
                    emitter.summary.fetch_failures += 1;
                    continue;
                }
            };

            emitter.summary.pages_fetched += 1;
            emitter.node(SiteNode::internal(task.url.clone(), page.title.as_deref()));

            if !self.policy.follows_links(task.depth) {
                continue;
            }

            if !self.is_running() {
                return RunOutcome::Stopped;
            }

            self.process_links(&task, &page, &root_domain, &mut frontier, emitter);
        }
    }

    /// Classifies every link of a fetched page and emits the resulting nodes and edges
    fn process_links(
        &self,
        task: &CrawlTask,
        page: &FetchedPage,
        root_domain: &str,
        frontier: &mut Frontier,
        emitter: &mut RunEmitter,
    ) {
        let mut traversal = lock(&self.shared.traversal);

        for link in &page.links {
            // Relative hrefs resolve against the document URL, which differs after a redirect
            let Some(target) = resolve(&page.url, &link.href) else {
                tracing::trace!("Skipping href {:?} on {}", link.href, task.url);
                continue;
            };

            if self.policy.suppresses_self_links() && (target == task.url || target == page.url)
            {
                continue;
            }

            if !is_same_site(&target, &self.target, root_domain) {
                let node = SiteNode::external(domain_of(&target));
                let id = node.id();
                emitter.node(node);
                emitter.edge(Edge::new(task.url.clone(), id));
                continue;
            }

            if let Some(base_path) = traversal.grouping.classify(&target) {
                emitter.node(SiteNode::grouped(base_path.clone()));
                emitter.edge(Edge::new(task.url.clone(), base_path));
                continue;
            }

            if self.policy.enqueues_links() {
                if !traversal.visited.contains(&target) {
                    frontier.push(CrawlTask::new(target.clone(), task.depth + 1));
                }
            } else {
                emitter.node(SiteNode::pending(target.clone(), link.text.as_deref()));
            }
            emitter.edge(Edge::new(task.url.clone(), target));
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Emits events for one run and guarantees its `Finished` event
///
/// If the run task unwinds before finishing, dropping the emitter reports the run as aborted.
struct RunEmitter {
    sink: Arc<dyn EventSink>,
    summary: RunSummary,
    shared: Arc<Shared>,
    generation: u64,
    finished: bool,
}

impl RunEmitter {
    fn new(
        sink: Arc<dyn EventSink>,
        mode: CrawlMode,
        shared: Arc<Shared>,
        generation: u64,
    ) -> Self {
        Self {
            sink,
            summary: RunSummary::begin(mode),
            shared,
            generation,
            finished: false,
        }
    }

    fn node(&mut self, node: SiteNode) {
        self.summary.nodes_emitted += 1;
        self.sink.emit(CrawlEvent::Node(node));
    }

    fn edge(&mut self, edge: Edge) {
        self.summary.edges_emitted += 1;
        self.sink.emit(CrawlEvent::Edge(edge));
    }

    fn finish(&mut self, outcome: RunOutcome) {
        if self.finished {
            return;
        }
        self.finished = true;

        self.shared.settle(self.generation, outcome);
        self.summary.finish(outcome);

        tracing::info!(
            "Run {}: {} pages fetched, {} failed, {} nodes, {} edges",
            outcome,
            self.summary.pages_fetched,
            self.summary.fetch_failures,
            self.summary.nodes_emitted,
            self.summary.edges_emitted
        );

        self.sink.emit(CrawlEvent::Finished(self.summary.clone()));
    }
}

impl Drop for RunEmitter {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("Run ended without reporting an outcome");
            self.finish(RunOutcome::Aborted);
        }
    }
}

async fn navigate(session: &SessionSlot, url: &str) -> Result<FetchedPage, FetchError> {
    let mut guard = session.lock().await;
    match guard.as_mut() {
        Some(session) => session.navigate(url).await,
        None => Err(FetchError::Closed),
    }
}

async fn release_session(session: &SessionSlot) {
    let taken = session.lock().await.take();
    if let Some(mut session) = taken {
        session.close().await;
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
