//! In-memory document sink

use crate::sink::{Document, DocumentSink, SinkResult};

/// Collects documents in a `Vec`, for tests and library callers that consume
/// results directly
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Vec<Document>,
}

impl MemorySink {
    /// Creates an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All documents added so far, in insertion order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of documents added
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the sink is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentSink for MemorySink {
    fn add_document(&mut self, document: &Document) -> SinkResult<()> {
        self.documents.push(document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_read_back() {
        let mut sink = MemorySink::new();
        assert!(sink.is_empty());

        let doc = Document::from_page(
            "https://example.com/",
            Some("Home".to_string()),
            "welcome text".to_string(),
            0,
            "https://example.com",
            "text/html",
        );
        sink.add_document(&doc).unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.documents()[0].title.as_deref(), Some("Home"));
    }
}
