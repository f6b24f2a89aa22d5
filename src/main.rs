//! Site-Mapper main entry point
//!
//! This is the command-line interface for the Site-Mapper link-structure explorer.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use site_mapper::config::{load_config_with_hash, Config, MAX_DEPTH_LIMIT};
use site_mapper::model::RunOutcome;
use site_mapper::output::{print_statistics, write_markdown_report, SiteGraph};
use site_mapper::{CrawlEngine, CrawlEvent, HttpLauncher, RunSummary};
use std::path::PathBuf;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing_subscriber::EnvFilter;

/// Site-Mapper: a link-structure explorer for websites
///
/// Site-Mapper visits the pages of a site, classifies every link it finds as internal,
/// external, or part of a repetitive list, and reports the resulting graph.
#[derive(Parser, Debug)]
#[command(name = "site-mapper")]
#[command(version)]
#[command(about = "A link-structure explorer for websites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Write a markdown report of the resulting graph
    #[arg(long, value_name = "FILE", global = true)]
    report: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site breadth-first from a seed URL
    Crawl {
        /// The seed URL
        url: String,

        /// Maximum link hops from the seed (overrides the config file)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=MAX_DEPTH_LIMIT as i64))]
        depth: Option<u32>,
    },

    /// Fetch pages one at a time and report their links without following them
    Scan {
        /// Pages to scan, in order
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_ref())?;
    let engine = CrawlEngine::new(HttpLauncher::new(&config));
    let mut graph = SiteGraph::new();
    let echo = !cli.quiet;

    let result = match &cli.command {
        Command::Crawl { url, depth } => {
            let depth = depth.unwrap_or(config.crawler.max_depth);
            handle_crawl(&engine, &mut graph, url, depth, echo).await
        }
        Command::Scan { urls } => handle_scan(&engine, &mut graph, urls, echo).await,
    };

    engine.cleanup().await;

    if !cli.quiet {
        println!();
        print_statistics(&graph);
    }

    if let Some(path) = &cli.report {
        write_markdown_report(&graph, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        tracing::info!("Report written to {}", path.display());
    }

    result
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_mapper=info,warn"),
            1 => EnvFilter::new("site_mapper=debug,info"),
            2 => EnvFilter::new("site_mapper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file if one was given
fn load_configuration(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Handles the crawl command
async fn handle_crawl(
    engine: &CrawlEngine,
    graph: &mut SiteGraph,
    url: &str,
    depth: u32,
    echo: bool,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    engine.start_crawling(url, depth, tx);

    let summary = drain_run(engine, &mut rx, graph, echo).await?;
    summary.ensure_started(url)?;
    Ok(())
}

/// Handles the scan command; one page session is shared by all scans
async fn handle_scan(
    engine: &CrawlEngine,
    graph: &mut SiteGraph,
    urls: &[String],
    echo: bool,
) -> anyhow::Result<()> {
    for url in urls {
        let (tx, mut rx) = mpsc::unbounded_channel();
        engine.crawl_single_page(url, tx);

        let summary = drain_run(engine, &mut rx, graph, echo).await?;
        summary.ensure_started(url)?;
        if summary.outcome == RunOutcome::Stopped {
            break;
        }
    }
    Ok(())
}

/// Consumes events until the run finishes; Ctrl-C requests a stop
async fn drain_run(
    engine: &CrawlEngine,
    rx: &mut UnboundedReceiver<CrawlEvent>,
    graph: &mut SiteGraph,
    echo: bool,
) -> anyhow::Result<RunSummary> {
    let mut interrupted = false;

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    bail!("Event stream closed before the run finished");
                };
                if echo {
                    print_event(&event);
                }
                graph.apply(&event);
                if let CrawlEvent::Finished(summary) = event {
                    return Ok(summary);
                }
            }
            signal = tokio::signal::ctrl_c(), if !interrupted => {
                if let Err(e) = signal {
                    tracing::warn!("Failed to listen for Ctrl-C: {}", e);
                }
                interrupted = true;
                tracing::info!("Interrupted, stopping");
                engine.stop().await;
            }
        }
    }
}

fn print_event(event: &CrawlEvent) {
    match event {
        CrawlEvent::Node(node) => println!("[{}] {}", node.class(), node),
        CrawlEvent::Edge(edge) => println!("    {}", edge),
        CrawlEvent::Finished(_) => {}
    }
}
