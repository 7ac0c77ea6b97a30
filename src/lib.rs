//! Forager: a polite web crawler feeding a knowledge base
//!
//! This crate implements a depth-bounded, page-capped breadth-first crawler
//! that fetches pages from a single origin, extracts clean prose text, and
//! hands validated pages to a pluggable document sink while emitting progress
//! events on a channel.

pub mod config;
pub mod crawler;
pub mod events;
pub mod extract;
pub mod proxy;
pub mod sink;
pub mod url;

use thiserror::Error;

/// Main error type for Forager operations
#[derive(Debug, Error)]
pub enum ForageError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] extract::ExtractError),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

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
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Forager operations
pub type Result<T> = std::result::Result<T, ForageError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator, PageResult};
pub use events::CrawlEvent;
pub use sink::{Document, DocumentMetadata, DocumentSink, MemorySink, SqliteSink};
pub use url::{base_origin, normalize_url, same_origin};
