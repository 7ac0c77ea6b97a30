//! Content extraction, validation, and link discovery
//!
//! This module turns raw page HTML into clean prose text and into candidate
//! crawl links:
//! - structural extraction probes article-like containers and falls back to a
//!   filtered text-node walk;
//! - validation strips boilerplate lines and rejects templated chrome;
//! - link discovery resolves, normalizes, and filters same-origin hyperlinks
//!   and merges best-effort sitemap entries.

mod content;
mod links;
mod validate;

pub use content::{extract_content, page_title};
pub use links::{discover_links, fetch_sitemap_links, is_crawlable_link};
pub use validate::validate_content;

use thiserror::Error;

/// Errors from content extraction and validation
///
/// These are soft failures: the crawl loop treats them as a page skip, not as
/// a job error.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("insufficient content: {length} chars, need {required}")]
    InsufficientContent { length: usize, required: usize },

    #[error("duplicated boilerplate: {distinct} distinct of {total} lines")]
    DuplicatedContent { distinct: usize, total: usize },
}
