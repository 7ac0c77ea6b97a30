//! Crawler module for web page fetching and frontier traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with failure classification
//! - The FIFO frontier with visited-set deduplication
//! - The breadth-first crawl loop with a bounded retry budget
//! - Event emission and sink hand-off

mod coordinator;
mod fetcher;
mod frontier;

pub use coordinator::{Coordinator, PageResult};
pub use fetcher::{build_http_client, fetch_once, FetchError, FetchedBody, FetchedPage};
pub use frontier::{Frontier, QueueItem};

use crate::config::Config;
use crate::events::EventSender;
use crate::sink::MemorySink;
use crate::ForageError;

/// Runs a complete crawl and returns the validated pages
///
/// Convenience entry point for library callers: pages are collected in
/// memory and progress events are discarded. Use [`Coordinator`] directly to
/// supply a sink or subscribe to events.
///
/// # Arguments
///
/// * `seed_url` - Where the traversal starts
/// * `max_pages` - Page cap for this job; `None` uses the configured cap
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Vec<PageResult>)` - Validated pages in BFS order
/// * `Err(ForageError)` - The seed URL was invalid
///
/// # Example
///
/// ```no_run
/// use forager::config::Config;
/// use forager::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let results = crawl("https://example.com", Some(10), Config::default()).await?;
/// for page in results {
///     println!("{} ({} chars)", page.url, page.content.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    seed_url: &str,
    max_pages: Option<u32>,
    config: Config,
) -> Result<Vec<PageResult>, ForageError> {
    let mut coordinator = Coordinator::new(config, MemorySink::new(), EventSender::disabled())?;
    coordinator.crawl(seed_url, max_pages).await
}
