//! Integration tests for the crawl engine
//!
//! These tests use wiremock to create mock HTTP servers and drive full crawls and
//! single-page scans end-to-end through the HTTP fetcher.

use site_mapper::config::Config;
use site_mapper::model::{NodeClass, RunOutcome};
use site_mapper::output::SiteGraph;
use site_mapper::{CrawlEngine, CrawlEvent, Edge, EngineState, HttpLauncher, RunSummary};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.request_timeout = 5;
    config.crawler.connect_timeout = 2;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "1.0.0".to_string();
    config.user_agent.contact_url = Some("https://example.com/contact".to_string());
    config
}

fn create_engine() -> CrawlEngine {
    CrawlEngine::new(HttpLauncher::new(&create_test_config()))
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html")
}

async fn mount_page(server: &MockServer, page_path: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Applies events to a graph until the run finishes
async fn drain(rx: &mut UnboundedReceiver<CrawlEvent>, graph: &mut SiteGraph) -> RunSummary {
    loop {
        match rx.recv().await {
            Some(CrawlEvent::Finished(summary)) => {
                graph.apply(&CrawlEvent::Finished(summary.clone()));
                return summary;
            }
            Some(event) => {
                graph.apply(&event);
            }
            None => panic!("event stream closed without Finished"),
        }
    }
}

async fn crawl(engine: &CrawlEngine, seed: &str, depth: u32) -> (SiteGraph, RunSummary) {
    let (tx, mut rx) = mpsc::unbounded_channel();
    engine.start_crawling(seed, depth, tx);
    let mut graph = SiteGraph::new();
    let summary = drain(&mut rx, &mut graph).await;
    (graph, summary)
}

async fn scan(engine: &CrawlEngine, url: &str, graph: &mut SiteGraph) -> RunSummary {
    let (tx, mut rx) = mpsc::unbounded_channel();
    engine.crawl_single_page(url, tx);
    drain(&mut rx, graph).await
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
        <a href="/page1">Page 1</a>
        <a href="page2">Page 2</a>
        <a href="https://external.example.org/about">Partner</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/page1",
        r#"<html><head><title>Page One</title></head><body>
        <a href="/">Home</a>
        <a href="/page2#details">Page 2</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/page2",
        "<html><head><title>Page Two</title></head><body></body></html>",
    )
    .await;

    let engine = create_engine();
    let (graph, summary) = crawl(&engine, &format!("{}/", base), 2).await;

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.fetch_failures, 0);

    assert_eq!(graph.count(NodeClass::Internal), 3);
    assert_eq!(graph.count(NodeClass::External), 1);
    assert_eq!(
        graph.node(&format!("{}/page1", base)).unwrap().title(),
        "Page One"
    );
    assert_eq!(
        graph.node("ext://external.example.org").unwrap().title(),
        "external.example.org"
    );

    let root = format!("{}/", base);
    assert!(graph
        .edges()
        .contains(&Edge::new(root.clone(), "ext://external.example.org")));
    assert!(graph
        .edges()
        .contains(&Edge::new(format!("{}/page1", base), format!("{}/page2", base))));
    assert!(graph
        .edges()
        .contains(&Edge::new(format!("{}/page1", base), root)));

    assert_eq!(engine.state(), EngineState::Finished);
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<html><body><a href="/level1">1</a></body></html>"#).await;
    mount_page(
        &server,
        "/level1",
        r#"<html><body><a href="/level2">2</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html("<html><body></body></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let engine = create_engine();
    let (graph, summary) = crawl(&engine, &format!("{}/", base), 1).await;

    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(graph.count(NodeClass::Internal), 2);
    // Links of the page at the depth bound are not examined
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.node(&format!("{}/level2", base)).is_none());
}

#[tokio::test]
async fn test_list_pages_grouped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body>
        <a href="/items/1">One</a>
        <a href="/items/2">Two</a>
        <a href="/items/3">Three</a>
        <a href="/tags/red">Red</a>
        <a href="/tags/blue">Blue</a>
        <a href="/tags/green">Green</a>
        <a href="/tags/yellow">Yellow</a>
        </body></html>"#,
    )
    .await;
    for tag in ["red", "blue", "green"] {
        mount_page(&server, &format!("/tags/{}", tag), "<html><body></body></html>").await;
    }

    let engine = create_engine();
    let (graph, summary) = crawl(&engine, &format!("{}/", base), 1).await;

    let items = graph.node(&format!("{}/items/", base)).unwrap();
    assert_eq!(items.class(), NodeClass::Grouped);
    assert_eq!(items.title(), "List: /items/*");

    let tags = graph.node(&format!("{}/tags/", base)).unwrap();
    assert_eq!(tags.class(), NodeClass::Grouped);

    // Root plus the three tags seen before the threshold was passed
    assert_eq!(summary.pages_fetched, 4);
    assert!(graph.node(&format!("{}/items/1", base)).is_none());
    assert!(graph.node(&format!("{}/tags/yellow", base)).is_none());
}

#[tokio::test]
async fn test_content_type_and_errors_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<html><body>
        <a href="/files/report.pdf">Report</a>
        <a href="/gone/missing">Missing</a>
        <a href="/api/broken">Broken</a>
        <a href="/ok">Ok</a>
        </body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/files/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_page(&server, "/ok", "<html><head><title>Ok</title></head></html>").await;

    let engine = create_engine();
    let (graph, summary) = crawl(&engine, &format!("{}/", base), 1).await;

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.pages_fetched, 2);
    assert_eq!(summary.fetch_failures, 3);
    assert_eq!(graph.count(NodeClass::Internal), 2);
    // Edges are reported even for targets that fail to load
    assert_eq!(graph.edge_count(), 4);
}

#[tokio::test]
async fn test_unreachable_seed_finishes() {
    // Nothing listens on port 1
    let engine = create_engine();
    let (graph, summary) = crawl(&engine, "http://127.0.0.1:1/", 2).await;

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(graph.node_count(), 0);
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<html><body><a href="/old">Old</a></body></html>"#).await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/new/",
        r#"<html><head><title>New</title></head><body><a href="child">Child</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/new/child", "<html><body></body></html>").await;

    let engine = create_engine();
    let (graph, _) = crawl(&engine, &format!("{}/", base), 2).await;

    // The page keeps the identity it was requested under
    let old = graph.node(&format!("{}/old", base)).unwrap();
    assert_eq!(old.class(), NodeClass::Internal);
    assert_eq!(old.title(), "New");
    assert!(graph.edges().contains(&Edge::new(
        format!("{}/old", base),
        format!("{}/new/child", base)
    )));
}

#[tokio::test]
async fn test_user_agent_header() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact)",
        ))
        .respond_with(html("<html><head><title>Hello</title></head></html>"))
        .mount(&server)
        .await;

    let engine = create_engine();
    let (_, summary) = crawl(&engine, &format!("{}/", base), 0).await;

    assert_eq!(summary.pages_fetched, 1);
}

#[tokio::test]
async fn test_single_page_scans() {
    let server = MockServer::start().await;
    let base = server.uri();
    let root = format!("{}/", base);

    mount_page(
        &server,
        "/",
        r#"<html><head><title>Home</title></head><body>
        <a href="/">Home</a>
        <a href="/docs">Documentation</a>
        <a href="/blog"></a>
        <a href="https://external.example.org/">Partner</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/docs",
        r#"<html><head><title>Docs</title></head><body>
        <a href="/">Back home</a>
        </body></html>"#,
    )
    .await;

    let engine = create_engine();
    let mut graph = SiteGraph::new();

    let first = scan(&engine, &root, &mut graph).await;
    assert_eq!(first.outcome, RunOutcome::Completed);
    assert_eq!(first.pages_fetched, 1);

    let docs = graph.node(&format!("{}/docs", base)).unwrap();
    assert_eq!(docs.class(), NodeClass::Pending);
    assert_eq!(docs.title(), "Documentation");
    let blog = graph.node(&format!("{}/blog", base)).unwrap();
    assert_eq!(blog.title(), format!("{}/blog", base));
    assert!(!graph.edges().contains(&Edge::new(root.clone(), root.clone())));
    assert_eq!(graph.count(NodeClass::External), 1);

    // Expanding the pending node upgrades it; the link back home keeps the fetched node
    scan(&engine, &format!("{}/docs", base), &mut graph).await;
    assert_eq!(
        graph.node(&format!("{}/docs", base)).unwrap().class(),
        NodeClass::Internal
    );
    assert_eq!(graph.node(&root).unwrap().class(), NodeClass::Internal);
    assert!(graph
        .edges()
        .contains(&Edge::new(format!("{}/docs", base), root)));

    engine.cleanup().await;
    assert_eq!(engine.state(), EngineState::Idle);
}

#[tokio::test]
async fn test_invalid_seed_aborts() {
    let engine = create_engine();
    let (graph, summary) = crawl(&engine, "ftp://example.com/", 2).await;

    assert_eq!(summary.outcome, RunOutcome::Aborted);
    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.runs().len(), 1);
}
