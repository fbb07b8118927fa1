use crate::embedding::EmbeddingProvider;
use crate::store::DocumentStore;
use docsense_core::{DocsenseError, DocsenseResult, ScoredChunk};
use std::sync::Arc;
use tracing::debug;

/// Norms get this added before division so a zero vector scores 0 instead of
/// poisoning the result with NaN.
const NORM_EPSILON: f32 = 1e-8;

/// Top-k cosine similarity retrieval over one document's chunks.
pub struct Retriever {
    store: Arc<DocumentStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    /// Creates a retriever over the given store and embedding provider.
    pub fn new(store: Arc<DocumentStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Returns the `top_k` chunks of `document_id` most similar to `query`,
    /// ordered by similarity descending with ties broken by original chunk
    /// index, so retrieval is deterministic. Returns every chunk when the
    /// document has fewer than `top_k`.
    pub async fn retrieve(
        &self,
        query: &str,
        document_id: &str,
        top_k: usize,
    ) -> DocsenseResult<Vec<ScoredChunk>> {
        let entry = self.store.get(document_id).await.ok_or_else(|| {
            DocsenseError::NotFound(format!("Document {document_id} not found in index"))
        })?;

        let query_embedding = self.embedder.embed(query).await?;

        let mut scored: Vec<ScoredChunk> = entry
            .chunks
            .iter()
            .zip(entry.embeddings.iter())
            .map(|(chunk, embedding)| ScoredChunk {
                chunk: chunk.clone(),
                similarity: cosine_similarity(&query_embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.chunk.index.cmp(&b.chunk.index))
        });
        scored.truncate(top_k);

        debug!(
            document_id = %document_id,
            results = scored.len(),
            top_score = scored.first().map(|s| s.similarity).unwrap_or(0.0),
            "Retrieval complete"
        );

        Ok(scored)
    }
}

/// Cosine similarity: dot product of the two vectors after L2 normalization,
/// with [`NORM_EPSILON`] added to each norm to avoid division by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt() + NORM_EPSILON;
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt() + NORM_EPSILON;
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot / (na * nb)
}
