//! Crawl lifecycle events
//!
//! Progress is reported as a single stream of [`CrawlEvent`] values over a
//! channel. Consumers (CLI logging, UI, metrics) subscribe once and pattern
//! match on the variant. Events are observational only: nothing in the crawl
//! depends on whether anyone is listening, and a dropped receiver never
//! errors the job.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// One event in the lifecycle of a crawl job
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    /// The job passed seed validation and is about to fetch its first page
    Started { start_url: String, max_pages: u32 },

    /// A queued page is being fetched
    ProcessingPage {
        url: String,
        current: u32,
        total: u32,
        depth: u32,
    },

    /// A page passed validation and produced a result
    PageProcessed {
        url: String,
        content_length: usize,
        new_links: usize,
        depth: u32,
    },

    /// A page was rejected by content validation (soft skip)
    PageSkipped {
        url: String,
        reason: String,
        depth: u32,
    },

    /// A page failed permanently (non-retryable error or retry budget spent)
    PageError {
        url: String,
        error: String,
        depth: u32,
    },

    /// The document sink accepted a page
    DocumentAdded {
        url: String,
        document_id: String,
        content_length: usize,
        depth: u32,
    },

    /// The document sink rejected a page; the job continues
    DocumentError { url: String, error: String },

    /// The job terminated normally
    Completed {
        pages_processed: u32,
        total_pages: u32,
        base_url: String,
        max_depth_reached: u32,
    },

    /// The job aborted before or during the loop (invalid seed)
    Failed { error: String },
}

/// Sending half of the event stream held by the coordinator
///
/// A disabled sender swallows events, so library callers who do not care
/// about progress pay nothing.
#[derive(Clone)]
pub struct EventSender {
    tx: Option<UnboundedSender<CrawlEvent>>,
}

impl EventSender {
    /// Wraps a channel sender
    pub fn new(tx: UnboundedSender<CrawlEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Creates a sender that discards every event
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Emits an event, ignoring a closed or missing receiver
    pub fn emit(&self, event: CrawlEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}

/// Creates a connected event stream
pub fn channel() -> (EventSender, UnboundedReceiver<CrawlEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender::new(tx), rx)
}
