use crate::embedding::EmbeddingProvider;
use crate::store::{DocumentEntry, DocumentStore};
use chrono::Utc;
use docsense_core::{Chunk, DocsenseError, DocsenseResult};
use std::sync::Arc;
use tracing::info;

/// Embeds document chunks and writes [`DocumentEntry`] records into the store.
pub struct DocumentIndexer {
    store: Arc<DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl DocumentIndexer {
    /// Creates an indexer over the given store and embedding provider.
    pub fn new(store: Arc<DocumentStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Embeds every chunk in one batched provider call and stores the entry,
    /// replacing any prior entry for the same document id.
    ///
    /// No-op when `chunks` is empty. Fails with a validation error if the
    /// provider returns a vector whose length differs from its declared
    /// dimension; nothing is stored in that case.
    pub async fn index_document(
        &self,
        document_id: &str,
        chunks: Vec<Chunk>,
        full_text: String,
    ) -> DocsenseResult<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let expected = self.embedder.dimension();
        for embedding in &embeddings {
            if embedding.len() != expected {
                return Err(DocsenseError::Validation(format!(
                    "Embedding dimension mismatch: expected {expected}, got {}",
                    embedding.len()
                )));
            }
        }

        debug_assert_eq!(embeddings.len(), chunks.len());

        info!(
            document_id = %document_id,
            chunks = chunks.len(),
            "Document indexed"
        );

        self.store
            .insert(DocumentEntry {
                document_id: document_id.to_string(),
                chunks,
                embeddings,
                full_text,
                indexed_at: Utc::now(),
            })
            .await;

        Ok(())
    }
}
