//! Page fetcher abstraction and its HTTP implementation
//!
//! The engine never talks to the network directly. It asks a [`FetcherLauncher`] for a
//! [`PageSession`], navigates that session to each page and reads back the document URL, the
//! title and the anchors. The session is a held resource: it is opened once per run (or once
//! for a series of single-page scans) and must be closed when the engine is done with it.
//!
//! [`HttpLauncher`] is the built-in implementation:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests with automatic redirect following (max 10 hops)
//! - Content-Type checks, so only HTML documents are parsed
//! - Error classification

use super::parser::{parse_html, PageLink};
use crate::config::{Config, CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// Maximum redirect hops followed for one navigation
pub const MAX_REDIRECTS: usize = 10;

/// Errors raised while launching a session or loading a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to launch page fetcher: {0}")]
    Launch(String),

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Not an HTML document ({content_type}) at {url}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Timed out loading {url}")]
    Timeout { url: String },

    #[error("Network error loading {url}: {message}")]
    Network { url: String, message: String },

    #[error("Page session is closed")]
    Closed,
}

/// A loaded document as seen by the engine
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The document URL after redirects; relative hrefs resolve against it
    pub url: String,

    /// The document title, if any
    pub title: Option<String>,

    /// Anchors in document order
    pub links: Vec<PageLink>,
}

/// Opens page sessions
#[async_trait]
pub trait FetcherLauncher: Send + Sync + 'static {
    /// Acquires a new session
    async fn launch(&self) -> Result<Box<dyn PageSession>, FetchError>;
}

/// A held fetching resource that loads one page at a time
///
/// Implementations should also release their resources on drop, so a session abandoned by a
/// panicking run does not leak.
#[async_trait]
pub trait PageSession: Send {
    /// Loads a page and returns its document URL, title and anchors
    async fn navigate(&mut self, url: &str) -> Result<FetchedPage, FetchError>;

    /// Releases the session; navigating afterwards returns [`FetchError::Closed`]
    async fn close(&mut self);
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Timeouts for connecting and loading
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_mapper::config::Config;
/// use site_mapper::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.user_agent, &config.crawler).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.request_timeout))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Launches HTTP page sessions
#[derive(Debug, Clone)]
pub struct HttpLauncher {
    user_agent: UserAgentConfig,
    crawler: CrawlerConfig,
}

impl HttpLauncher {
    pub fn new(config: &Config) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            crawler: config.crawler.clone(),
        }
    }
}

impl Default for HttpLauncher {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

#[async_trait]
impl FetcherLauncher for HttpLauncher {
    async fn launch(&self) -> Result<Box<dyn PageSession>, FetchError> {
        let client = build_http_client(&self.user_agent, &self.crawler)
            .map_err(|e| FetchError::Launch(e.to_string()))?;
        tracing::debug!("HTTP session opened");
        Ok(Box::new(HttpSession {
            client: Some(client),
        }))
    }
}

/// One HTTP session; dropping the client releases its connection pool
#[derive(Debug)]
pub struct HttpSession {
    client: Option<Client>,
}

#[async_trait]
impl PageSession for HttpSession {
    async fn navigate(&mut self, url: &str) -> Result<FetchedPage, FetchError> {
        let client = self.client.as_ref().ok_or(FetchError::Closed)?;
        let body = fetch_html(client, url).await?;
        let parsed = parse_html(&body.content);

        Ok(FetchedPage {
            url: body.final_url,
            title: parsed.title,
            links: parsed.links,
        })
    }

    async fn close(&mut self) {
        if self.client.take().is_some() {
            tracing::debug!("HTTP session closed");
        }
    }
}

struct HtmlBody {
    final_url: String,
    content: String,
}

/// Fetches a URL and returns its HTML body
///
/// | Condition | Result |
/// |-----------|--------|
/// | Non-success status | `Status` |
/// | Content-Type without `text/html` | `ContentMismatch` |
/// | Timeout | `Timeout` |
/// | Connection refused, TLS, redirect limit | `Network` |
async fn fetch_html(client: &Client, url: &str) -> Result<HtmlBody, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    // Check Content-Type
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.contains("text/html") {
        return Err(FetchError::ContentMismatch {
            url: url.to_string(),
            content_type,
        });
    }

    let content = response.text().await.map_err(|e| classify_error(url, e))?;

    Ok(HtmlBody { final_url, content })
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
