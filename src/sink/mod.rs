//! Document sink interface
//!
//! The crawler hands every validated page to a [`DocumentSink`]. The sink is
//! the boundary to the surrounding knowledge-ingestion system: Forager ships
//! an in-memory sink for tests and library callers, and a SQLite sink for the
//! CLI. Sink failures surface as `DocumentError` events and never abort a
//! crawl.

mod memory;
mod sqlite;

pub use memory::MemorySink;
pub use sqlite::SqliteSink;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors that can occur while persisting a document
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Metadata recorded with every crawled document
///
/// This is a fixed struct rather than an open key/value bag, so integration
/// mismatches show up at compile time.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMetadata {
    /// The URL the content was extracted from
    pub source_url: String,

    /// BFS depth of the page within its crawl job
    pub crawl_depth: u32,

    /// When the page was fetched
    pub crawl_timestamp: DateTime<Utc>,

    /// Origin of the crawl job's seed URL
    pub base_url: String,

    /// Length of the extracted content in bytes
    pub size: usize,

    /// MIME type of the fetched body
    pub mime_type: String,
}

/// A crawled page ready for ingestion
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Stable identifier derived from the source URL
    pub id: String,

    /// Page title, when one could be extracted
    pub title: Option<String>,

    /// Cleaned page text
    pub content: String,

    /// Document kind; always `"url"` for crawled pages
    pub doc_type: String,

    /// Fixed crawl metadata
    pub metadata: DocumentMetadata,

    /// Ingestion status; new documents are `"pending"`
    pub status: String,
}

impl Document {
    /// Builds a document for a crawled page
    ///
    /// The id is the hex SHA-256 of the normalized source URL, so re-crawling
    /// the same page updates rather than duplicates.
    pub fn from_page(
        url: &str,
        title: Option<String>,
        content: String,
        depth: u32,
        base_url: &str,
        mime_type: &str,
    ) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let id = hex::encode(hasher.finalize());

        let size = content.len();
        Self {
            id,
            title,
            content,
            doc_type: "url".to_string(),
            metadata: DocumentMetadata {
                source_url: url.to_string(),
                crawl_depth: depth,
                crawl_timestamp: Utc::now(),
                base_url: base_url.to_string(),
                size,
                mime_type: mime_type.to_string(),
            },
            status: "pending".to_string(),
        }
    }
}

/// Destination for crawled documents
///
/// Implementations may fail per document; the crawler reports the failure as
/// an event and keeps going.
pub trait DocumentSink {
    /// Persists one document
    fn add_document(&mut self, document: &Document) -> SinkResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_is_stable() {
        let a = Document::from_page(
            "https://example.com/a",
            None,
            "content".to_string(),
            0,
            "https://example.com",
            "text/html",
        );
        let b = Document::from_page(
            "https://example.com/a",
            None,
            "other".to_string(),
            2,
            "https://example.com",
            "text/html",
        );
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.len(), 64);
    }

    #[test]
    fn test_document_id_differs_per_url() {
        let a = Document::from_page(
            "https://example.com/a",
            None,
            "x".to_string(),
            0,
            "https://example.com",
            "text/html",
        );
        let b = Document::from_page(
            "https://example.com/b",
            None,
            "x".to_string(),
            0,
            "https://example.com",
            "text/html",
        );
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_from_page_fills_metadata() {
        let doc = Document::from_page(
            "https://example.com/deep/page",
            Some("Title".to_string()),
            "some extracted text".to_string(),
            2,
            "https://example.com",
            "text/plain",
        );
        assert_eq!(doc.doc_type, "url");
        assert_eq!(doc.status, "pending");
        assert_eq!(doc.metadata.crawl_depth, 2);
        assert_eq!(doc.metadata.size, "some extracted text".len());
        assert_eq!(doc.metadata.mime_type, "text/plain");
        assert_eq!(doc.metadata.base_url, "https://example.com");
    }
}
