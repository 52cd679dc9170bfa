//! Tululu crawler: an offline mirror for one tululu.org book category
//!
//! This crate walks the numbered listing pages of a category, visits every book
//! detail page, downloads the plain-text book and its cover, and writes a JSON
//! catalog describing everything that was saved.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum TululuError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Cannot prepare output directory {path}: {source}")]
    Setup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Catalog serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::UrlState,
        to: state::UrlState,
    },

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

/// Network-level failures; every variant is eligible for retry
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Returns true if the failure may go away on a later attempt
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status { .. } | Self::Transport { .. } => true,
        }
    }
}

/// The page did not have the structure the extractor expects
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No element matches `{selector}`")]
    MissingElement { selector: &'static str },

    #[error("Heading `{heading}` is not of the form `Title :: Author`")]
    MalformedHeading { heading: String },

    #[error("Field `{field}` is empty")]
    EmptyField { field: &'static str },

    #[error("Download link `{link}` carries no book id")]
    MissingBookId { link: String },

    #[error("Link `{link}` cannot be resolved")]
    InvalidLink { link: String },

    #[error("Invalid CSS selector `{selector}`")]
    InvalidSelector { selector: &'static str },
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, TululuError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Either a value was found, or the site says there is nothing there
///
/// Returned by the fetcher (a redirect means the resource is absent), by the
/// extractor (no download link) and by the assembler (no record).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence<T> {
    Found(T),
    Absent,
}

impl<T> Presence<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Absent => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Presence<U> {
        match self {
            Self::Found(value) => Presence::Found(f(value)),
            Self::Absent => Presence::Absent,
        }
    }
}

impl<T> From<Option<T>> for Presence<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Found(v),
            None => Self::Absent,
        }
    }
}

// Re-export commonly used types
pub use config::Config;
pub use output::{BookRecord, Catalog};
pub use state::UrlState;
