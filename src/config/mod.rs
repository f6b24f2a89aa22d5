//! Configuration module for Site Mapper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section has defaults, so a missing file can be replaced by `Config::default()`.
//!
//! # Example
//!
//! ```no_run
//! use site_mapper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("site-mapper.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, UserAgentConfig};
pub use validation::{MAX_DEPTH_LIMIT, MAX_TIMEOUT_SECS};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
