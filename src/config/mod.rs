//! Configuration module for the crawler
//!
//! Every setting has a default, so a TOML file is optional. Values from the
//! command line are applied on top of whatever the file provides.
//!
//! # Example
//!
//! ```no_run
//! use tululu_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("tululu.toml")).unwrap();
//! println!("Walking pages {}..{}", config.crawl.start_page, config.crawl.end_page);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlConfig, OutputConfig, RetryConfig, SiteConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
