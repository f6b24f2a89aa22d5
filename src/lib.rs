//! Site-Mapper: a link-structure explorer for websites
//!
//! This crate visits pages of a site, extracts their outbound links and classifies every
//! discovered URL as internal, external, or a member of a repetitive list that gets collapsed
//! into a single group node. Results are streamed as node/edge events to a consumer.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Mapper operations
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("Run for {target} was aborted (see log for the cause)")]
    RunAborted { target: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Site-Mapper operations
pub type Result<T> = std::result::Result<T, MapperError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, EngineState, HttpLauncher};
pub use model::{CrawlEvent, Edge, NodeClass, NodeKind, RunSummary, SiteNode};
pub use url::{domain_of, is_same_site, resolve};
