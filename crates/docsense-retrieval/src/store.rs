use chrono::{DateTime, Utc};
use docsense_core::{Chunk, DocsenseError, DocsenseResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Everything the index holds for one document.
///
/// Invariant: `embeddings.len() == chunks.len()` and embedding `i` belongs to
/// chunk `i`. Entries are immutable once created; re-indexing the same
/// document id replaces the whole entry.
#[derive(Debug, Clone)]
pub struct DocumentEntry {
    /// Caller-supplied opaque document key.
    pub document_id: String,
    /// Retrieval chunks in index order.
    pub chunks: Vec<Chunk>,
    /// One embedding per chunk, same order.
    pub embeddings: Vec<Vec<f32>>,
    /// The full extracted document text, kept for structured extraction.
    pub full_text: String,
    /// When this entry was (re-)indexed.
    pub indexed_at: DateTime<Utc>,
}

/// In-memory store owning every indexed document for the process lifetime.
///
/// Constructed explicitly and injected wherever indexing or retrieval happens,
/// so tests build isolated instances instead of sharing module-level state.
/// Entries are held as `Arc<DocumentEntry>` and swapped wholesale: a reader
/// that raced a re-index keeps its old snapshot, it never observes a
/// half-written entry. Last writer wins; there is no transactional isolation.
#[derive(Debug, Default)]
pub struct DocumentStore {
    entries: RwLock<HashMap<String, Arc<DocumentEntry>>>,
}

impl DocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing any prior entry for the same document id.
    pub async fn insert(&self, entry: DocumentEntry) {
        let mut entries = self.entries.write().await;
        entries.insert(entry.document_id.clone(), Arc::new(entry));
    }

    /// Returns a snapshot of the entry for `document_id`, if indexed.
    pub async fn get(&self, document_id: &str) -> Option<Arc<DocumentEntry>> {
        let entries = self.entries.read().await;
        entries.get(document_id).cloned()
    }

    /// Removes the entry for `document_id`. Returns `true` if one existed.
    pub async fn evict(&self, document_id: &str) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(document_id).is_some()
    }

    /// Whether the store holds an entry for `document_id`.
    pub async fn contains(&self, document_id: &str) -> bool {
        let entries = self.entries.read().await;
        entries.contains_key(document_id)
    }

    /// Number of indexed documents.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns the full text of an indexed document.
    pub async fn full_text(&self, document_id: &str) -> DocsenseResult<String> {
        self.get(document_id)
            .await
            .map(|entry| entry.full_text.clone())
            .ok_or_else(|| {
                DocsenseError::NotFound(format!("Document {document_id} not found in index"))
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn make_entry(document_id: &str, text: &str) -> DocumentEntry {
        DocumentEntry {
            document_id: document_id.to_string(),
            chunks: vec![Chunk::new(text, 0, document_id, text)],
            embeddings: vec![vec![1.0, 0.0]],
            full_text: text.to_string(),
            indexed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = DocumentStore::new();
        store.insert(make_entry("doc-1", "Rate is $500.")).await;

        let entry = store.get("doc-1").await.unwrap();
        assert_eq!(entry.document_id, "doc-1");
        assert_eq!(entry.chunks.len(), entry.embeddings.len());
    }

    #[tokio::test]
    async fn test_insert_replaces_wholesale() {
        let store = DocumentStore::new();
        store.insert(make_entry("doc-1", "Old text.")).await;
        let old = store.get("doc-1").await.unwrap();

        store.insert(make_entry("doc-1", "New text.")).await;
        let new = store.get("doc-1").await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(new.full_text, "New text.");
        // The old snapshot stays intact for any reader still holding it.
        assert_eq!(old.full_text, "Old text.");
    }

    #[tokio::test]
    async fn test_full_text_not_found() {
        let store = DocumentStore::new();
        let err = store.full_text("missing").await.unwrap_err();
        assert!(matches!(err, DocsenseError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_evict() {
        let store = DocumentStore::new();
        store.insert(make_entry("doc-1", "Some text.")).await;

        assert!(store.evict("doc-1").await);
        assert!(!store.evict("doc-1").await);
        assert!(!store.contains("doc-1").await);
        assert!(store.is_empty().await);
    }
}
