//! SQLite document sink
//!
//! Persists crawled documents into a single `documents` table. Metadata
//! fields are typed columns, not a serialized blob, so downstream ingestion
//! can query by depth, origin, or MIME type directly.

use crate::sink::{Document, DocumentMetadata, DocumentSink, SinkError, SinkResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQL schema for the document store
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    title TEXT,
    content TEXT NOT NULL,
    doc_type TEXT NOT NULL,
    status TEXT NOT NULL,
    source_url TEXT NOT NULL,
    crawl_depth INTEGER NOT NULL,
    crawl_timestamp TEXT NOT NULL,
    base_url TEXT NOT NULL,
    size INTEGER NOT NULL,
    mime_type TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_base_url ON documents(base_url);
CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(status);
"#;

/// SQLite-backed document sink
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens or creates a document database at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteSink)` - Successfully opened/created database
    /// * `Err(SinkError)` - Failed to open or initialize
    pub fn new(path: &Path) -> SinkResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        conn.execute_batch(SCHEMA_SQL)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Number of stored documents
    pub fn count_documents(&self) -> SinkResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Loads a document by id
    pub fn get_document(&self, id: &str) -> SinkResult<Option<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, doc_type, status, source_url, crawl_depth,
                    crawl_timestamp, base_url, size, mime_type
             FROM documents WHERE id = ?1",
        )?;

        let document = stmt
            .query_row(params![id], |row| {
                let timestamp: String = row.get(7)?;
                Ok(Document {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    content: row.get(2)?,
                    doc_type: row.get(3)?,
                    status: row.get(4)?,
                    metadata: DocumentMetadata {
                        source_url: row.get(5)?,
                        crawl_depth: row.get(6)?,
                        crawl_timestamp: timestamp
                            .parse::<DateTime<Utc>>()
                            .unwrap_or_else(|_| Utc::now()),
                        base_url: row.get(8)?,
                        size: row.get::<_, i64>(9)? as usize,
                        mime_type: row.get(10)?,
                    },
                })
            })
            .optional()?;

        Ok(document)
    }
}

impl DocumentSink for SqliteSink {
    fn add_document(&mut self, document: &Document) -> SinkResult<()> {
        let rows = self.conn.execute(
            "INSERT INTO documents
                (id, title, content, doc_type, status, source_url, crawl_depth,
                 crawl_timestamp, base_url, size, mime_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                status = excluded.status,
                crawl_depth = excluded.crawl_depth,
                crawl_timestamp = excluded.crawl_timestamp,
                size = excluded.size,
                mime_type = excluded.mime_type",
            params![
                document.id,
                document.title,
                document.content,
                document.doc_type,
                document.status,
                document.metadata.source_url,
                document.metadata.crawl_depth,
                document.metadata.crawl_timestamp.to_rfc3339(),
                document.metadata.base_url,
                document.metadata.size as i64,
                document.metadata.mime_type,
            ],
        )?;

        if rows == 0 {
            return Err(SinkError::Database(format!(
                "document {} was not written",
                document.id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(url: &str) -> Document {
        Document::from_page(
            url,
            Some("Sample".to_string()),
            "Some extracted page text of reasonable length for a test.".to_string(),
            1,
            "https://example.com",
            "text/html",
        )
    }

    #[test]
    fn test_add_and_count() {
        let mut sink = SqliteSink::new_in_memory().unwrap();
        assert_eq!(sink.count_documents().unwrap(), 0);

        sink.add_document(&sample("https://example.com/a")).unwrap();
        sink.add_document(&sample("https://example.com/b")).unwrap();

        assert_eq!(sink.count_documents().unwrap(), 2);
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let mut sink = SqliteSink::new_in_memory().unwrap();
        let doc = sample("https://example.com/page");
        sink.add_document(&doc).unwrap();

        let loaded = sink.get_document(&doc.id).unwrap().unwrap();
        assert_eq!(loaded.title, doc.title);
        assert_eq!(loaded.content, doc.content);
        assert_eq!(loaded.doc_type, "url");
        assert_eq!(loaded.status, "pending");
        assert_eq!(loaded.metadata.source_url, "https://example.com/page");
        assert_eq!(loaded.metadata.crawl_depth, 1);
        assert_eq!(loaded.metadata.mime_type, "text/html");
    }

    #[test]
    fn test_recrawl_updates_in_place() {
        let mut sink = SqliteSink::new_in_memory().unwrap();
        let doc = sample("https://example.com/page");
        sink.add_document(&doc).unwrap();

        let mut updated = sample("https://example.com/page");
        updated.content = "Fresh content from a later crawl of the very same page.".to_string();
        sink.add_document(&updated).unwrap();

        assert_eq!(sink.count_documents().unwrap(), 1);
        let loaded = sink.get_document(&doc.id).unwrap().unwrap();
        assert!(loaded.content.starts_with("Fresh content"));
    }

    #[test]
    fn test_missing_document_is_none() {
        let sink = SqliteSink::new_in_memory().unwrap();
        assert!(sink.get_document("does-not-exist").unwrap().is_none());
    }

    #[test]
    fn test_file_backed_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("docs.db");

        {
            let mut sink = SqliteSink::new(&db_path).unwrap();
            sink.add_document(&sample("https://example.com/a")).unwrap();
        }

        let sink = SqliteSink::new(&db_path).unwrap();
        assert_eq!(sink.count_documents().unwrap(), 1);
    }
}
