//! Crawl coordinator - main crawl orchestration logic
//!
//! The coordinator owns one crawl job end to end:
//! - validating the seed URL before any network activity
//! - seeding the frontier, merging best-effort sitemap URLs
//! - the breadth-first loop over the FIFO frontier
//! - the single bounded retry budget per URL with exponential backoff
//! - handing validated pages to the document sink
//! - emitting lifecycle events and honoring cancellation

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_once, FetchedBody};
use crate::crawler::frontier::{Frontier, QueueItem};
use crate::events::{CrawlEvent, EventSender};
use crate::extract::{
    discover_links, extract_content, fetch_sitemap_links, page_title, validate_content,
};
use crate::proxy::ProxyRouter;
use crate::sink::{Document, DocumentSink};
use crate::url::{base_origin, normalize_url};
use crate::ForageError;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A page that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// Normalized page URL
    pub url: String,

    /// Cleaned page text
    pub content: String,

    /// BFS depth of the page
    pub depth: u32,
}

/// Terminal outcome of processing one queued page
enum PageOutcome {
    Success {
        content: String,
        links: HashSet<String>,
        title: Option<String>,
        mime_type: &'static str,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
    },
}

/// Main crawler coordinator structure
pub struct Coordinator<S: DocumentSink> {
    config: Config,
    client: Client,
    router: ProxyRouter,
    sink: S,
    events: EventSender,
    cancel: CancellationToken,
}

impl<S: DocumentSink> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `sink` - Destination for validated pages
    /// * `events` - Event stream for crawl progress
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to crawl
    /// * `Err(ForageError)` - Failed to build the HTTP client
    pub fn new(config: Config, sink: S, events: EventSender) -> Result<Self, ForageError> {
        let client = build_http_client(&config.user_agent, config.crawler.fetch_timeout_secs)?;
        let router = ProxyRouter::new(&config.proxy);

        Ok(Self {
            config,
            client,
            router,
            sink,
            events,
            cancel: CancellationToken::new(),
        })
    }

    /// Returns a token that aborts the crawl when cancelled
    ///
    /// Cancellation is checked at the top of every loop iteration; the crawl
    /// then terminates normally with the pages processed so far.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Borrows the document sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the coordinator and returns its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Runs a crawl job from `seed_url`
    ///
    /// # Arguments
    ///
    /// * `seed_url` - Where the traversal starts; must be a valid HTTP(S) URL
    /// * `max_pages` - Page cap for this job; defaults to the configured cap
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<PageResult>)` - Validated pages in BFS order
    /// * `Err(ForageError)` - The seed URL was invalid
    pub async fn crawl(
        &mut self,
        seed_url: &str,
        max_pages: Option<u32>,
    ) -> Result<Vec<PageResult>, ForageError> {
        let max_pages = max_pages.unwrap_or(self.config.crawler.max_pages);

        // Seed validation happens before any network activity
        let seed = match normalize_url(seed_url) {
            Ok(url) => url,
            Err(e) => {
                let error = ForageError::InvalidSeed {
                    url: seed_url.to_string(),
                    reason: e.to_string(),
                };
                self.events.emit(CrawlEvent::Failed {
                    error: error.to_string(),
                });
                return Err(error);
            }
        };
        let base_url = match base_origin(&seed) {
            Ok(origin) => origin,
            Err(e) => {
                let error = ForageError::InvalidSeed {
                    url: seed_url.to_string(),
                    reason: e.to_string(),
                };
                self.events.emit(CrawlEvent::Failed {
                    error: error.to_string(),
                });
                return Err(error);
            }
        };

        tracing::info!(
            "Starting crawl of {} (max {} pages, max depth {})",
            seed,
            max_pages,
            self.config.crawler.max_depth
        );
        self.events.emit(CrawlEvent::Started {
            start_url: seed.to_string(),
            max_pages,
        });

        let mut frontier = Frontier::new(self.config.crawler.max_depth);
        frontier.enqueue(seed.clone(), 0);

        // Best-effort sitemap merge; discovered URLs enter as children of
        // the seed
        for link in fetch_sitemap_links(&self.client, &seed).await {
            if let Ok(url) = Url::parse(&link) {
                frontier.enqueue(url, 1);
            }
        }

        let start_time = std::time::Instant::now();
        let mut results: Vec<PageResult> = Vec::new();
        let mut max_depth_reached = 0u32;

        loop {
            if (results.len() as u32) >= max_pages {
                tracing::info!("Page cap of {} reached", max_pages);
                break;
            }
            if self.cancel.is_cancelled() {
                tracing::info!("Crawl cancelled, stopping after {} pages", results.len());
                break;
            }
            let Some(item) = frontier.pop() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            let url_string = item.url.to_string();
            if frontier.is_visited(&url_string) || item.depth > self.config.crawler.max_depth {
                continue;
            }

            self.events.emit(CrawlEvent::ProcessingPage {
                url: url_string.clone(),
                current: results.len() as u32 + 1,
                total: max_pages,
                depth: item.depth,
            });
            tracing::debug!("Processing {} (depth {})", url_string, item.depth);

            match self.process_with_retry(&item, &mut frontier).await {
                PageOutcome::Success {
                    content,
                    links,
                    title,
                    mime_type,
                } => {
                    frontier.mark_visited(&url_string);
                    max_depth_reached = max_depth_reached.max(item.depth);

                    let mut new_links = 0usize;
                    if item.depth < self.config.crawler.max_depth {
                        for link in &links {
                            if let Ok(link_url) = Url::parse(link) {
                                if frontier.enqueue(link_url, item.depth + 1) {
                                    new_links += 1;
                                }
                            }
                        }
                    }

                    self.events.emit(CrawlEvent::PageProcessed {
                        url: url_string.clone(),
                        content_length: content.len(),
                        new_links,
                        depth: item.depth,
                    });

                    let document = Document::from_page(
                        &url_string,
                        title,
                        content.clone(),
                        item.depth,
                        &base_url,
                        mime_type,
                    );
                    match self.sink.add_document(&document) {
                        Ok(()) => self.events.emit(CrawlEvent::DocumentAdded {
                            url: url_string.clone(),
                            document_id: document.id.clone(),
                            content_length: content.len(),
                            depth: item.depth,
                        }),
                        Err(e) => {
                            tracing::warn!("Sink rejected {}: {}", url_string, e);
                            self.events.emit(CrawlEvent::DocumentError {
                                url: url_string.clone(),
                                error: e.to_string(),
                            });
                        }
                    }

                    results.push(PageResult {
                        url: url_string,
                        content,
                        depth: item.depth,
                    });
                }

                PageOutcome::Skipped { reason } => {
                    frontier.mark_visited(&url_string);
                    tracing::debug!("Skipping {}: {}", url_string, reason);
                    self.events.emit(CrawlEvent::PageSkipped {
                        url: url_string,
                        reason,
                        depth: item.depth,
                    });
                }

                PageOutcome::Failed { error } => {
                    frontier.mark_visited(&url_string);
                    tracing::warn!("Failed to process {}: {}", url_string, error);
                    self.events.emit(CrawlEvent::PageError {
                        url: url_string,
                        error,
                        depth: item.depth,
                    });
                }
            }

            // Politeness throttle between fetches, skipped when no work is
            // left to pace
            if !frontier.is_empty() && (results.len() as u32) < max_pages {
                tokio::time::sleep(Duration::from_millis(
                    self.config.crawler.politeness_delay_ms,
                ))
                .await;
            }
        }

        tracing::info!(
            "Crawl finished: {} pages in {:?}",
            results.len(),
            start_time.elapsed()
        );
        self.events.emit(CrawlEvent::Completed {
            pages_processed: results.len() as u32,
            total_pages: max_pages,
            base_url,
            max_depth_reached,
        });

        Ok(results)
    }

    /// Fetches one page with the per-URL retry budget
    ///
    /// Attempts are recorded in the frontier and never reset within a job;
    /// retryable failures back off exponentially until the budget is spent,
    /// then fail the URL permanently.
    async fn process_with_retry(
        &mut self,
        item: &QueueItem,
        frontier: &mut Frontier,
    ) -> PageOutcome {
        let url_string = item.url.to_string();
        loop {
            let attempt = frontier.record_attempt(&url_string);
            match fetch_once(&self.client, &mut self.router, &item.url).await {
                Ok(page) => {
                    return match page.body {
                        FetchedBody::Html(html) => self.integrate_html(item, &html),
                        FetchedBody::PlainText(text) => self.integrate_raw(text, "text/plain"),
                        FetchedBody::Json(text) => self.integrate_raw(text, "application/json"),
                    };
                }
                Err(e) if e.is_retryable() && attempt <= self.config.crawler.max_retries_per_url => {
                    let backoff = Duration::from_millis(
                        self.config
                            .crawler
                            .retry_backoff_ms
                            .saturating_mul(1u64 << (attempt - 1).min(16)),
                    );
                    tracing::warn!(
                        "Attempt {} for {} failed ({}), retrying in {:?}",
                        attempt,
                        url_string,
                        e,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    return PageOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            }
        }
    }

    /// Extraction, validation, and link discovery for an HTML body
    fn integrate_html(&self, item: &QueueItem, html: &str) -> PageOutcome {
        let extracted = match extract_content(html, &self.config.extraction) {
            Ok(text) => text,
            Err(e) => {
                return PageOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
        };

        let content = match validate_content(&extracted, &self.config.extraction) {
            Ok(text) => text,
            Err(e) => {
                return PageOutcome::Skipped {
                    reason: e.to_string(),
                }
            }
        };

        PageOutcome::Success {
            links: discover_links(html, &item.url),
            title: page_title(html),
            content,
            mime_type: "text/html",
        }
    }

    /// Length gate for plain-text and JSON bodies; they carry no links and
    /// skip the HTML chrome heuristics
    fn integrate_raw(&self, text: String, mime_type: &'static str) -> PageOutcome {
        let min = self.config.extraction.min_content_length;
        if text.len() < min {
            return PageOutcome::Skipped {
                reason: format!("insufficient content: {} chars, need {}", text.len(), min),
            };
        }

        PageOutcome::Success {
            content: text,
            links: HashSet::new(),
            title: None,
            mime_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events;
    use crate::sink::MemorySink;

    #[tokio::test]
    async fn test_invalid_seed_fails_before_any_fetch() {
        let (sender, mut rx) = events::channel();
        let mut coordinator =
            Coordinator::new(Config::default(), MemorySink::new(), sender).unwrap();

        let result = coordinator.crawl("not a url", None).await;
        assert!(matches!(result, Err(ForageError::InvalidSeed { .. })));

        match rx.try_recv() {
            Ok(CrawlEvent::Failed { .. }) => {}
            other => panic!("expected Failed event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_http_seed_rejected() {
        let mut coordinator = Coordinator::new(
            Config::default(),
            MemorySink::new(),
            EventSender::disabled(),
        )
        .unwrap();

        let result = coordinator.crawl("ftp://example.com/", None).await;
        assert!(matches!(result, Err(ForageError::InvalidSeed { .. })));
    }
}
