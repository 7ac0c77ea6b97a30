//! Configuration handling for Forager
//!
//! Configuration is loaded from a TOML file with kebab-case keys. Every field
//! carries a default so the crawler can run with no config file at all; a
//! SHA-256 hash of the file content is recorded per crawl for change
//! detection.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{
    Config, CrawlerConfig, ExtractionConfig, OutputConfig, ProxyConfig, UserAgentConfig,
};
pub use validation::validate;
