use async_trait::async_trait;
use docsense_core::{DocsenseError, DocsenseResult};
use std::collections::HashMap;

/// Fixed dimension of the embedding space.
pub const EMBEDDING_DIM: usize = 384;

/// Capability trait for converting text into fixed-dimension vectors.
///
/// Implementations must be deterministic: the same input text always yields
/// the same vector. The core pipeline holds providers as `Arc<dyn
/// EmbeddingProvider>` so tests can substitute deterministic fakes at the
/// boundary.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Compute the embedding vector for a single text.
    async fn embed(&self, text: &str) -> DocsenseResult<Vec<f32>>;

    /// Compute embeddings for a batch of texts, preserving input order.
    ///
    /// Indexing embeds all chunks of a document through this entry point so
    /// providers backed by a remote model can batch the call.
    async fn embed_batch(&self, texts: &[&str]) -> DocsenseResult<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Dimension of the vectors produced by this provider.
    fn dimension(&self) -> usize;
}

/// Local bag-of-words hashing embedder.
///
/// Hashes each token to three positions of a fixed-size vector with decaying
/// TF weights, then L2-normalizes. No external service or model file needed;
/// deterministic by construction. Swap in a transformer-backed provider behind
/// the same trait for production-quality similarity.
pub struct HashedEmbedding {
    dimension: usize,
}

impl HashedEmbedding {
    /// Creates an embedder producing vectors of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashedEmbedding {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM)
    }
}

#[async_trait]
impl EmbeddingProvider for HashedEmbedding {
    async fn embed(&self, text: &str) -> DocsenseResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(DocsenseError::Validation(
                "Cannot embed empty text".to_string(),
            ));
        }

        let mut vector = vec![0.0f32; self.dimension];

        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let mut freq: HashMap<&str, f32> = HashMap::new();
        for word in &words {
            *freq.entry(word).or_insert(0.0) += 1.0;
        }

        let total = words.len() as f32;
        if total == 0.0 {
            return Ok(vector);
        }

        for (word, count) in &freq {
            let tf = count / total;
            let hash1 = fnv1a(word.as_bytes()) as usize;
            let hash2 = fnv1a(&[word.as_bytes(), &[1u8]].concat()) as usize;
            let hash3 = fnv1a(&[word.as_bytes(), &[2u8]].concat()) as usize;

            vector[hash1 % self.dimension] += tf;
            vector[hash2 % self.dimension] += tf * 0.7;
            vector[hash3 % self.dimension] += tf * 0.5;
        }

        // L2 normalize
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// FNV-1a hash, deterministic across runs and platforms.
fn fnv1a(data: &[u8]) -> u32 {
    let mut hash: u32 = 2166136261;
    for &byte in data {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dimension_is_384_by_default() {
        let emb = HashedEmbedding::default();
        assert_eq!(emb.dimension(), EMBEDDING_DIM);
        let vec = emb.embed("freight rate confirmation").await.unwrap();
        assert_eq!(vec.len(), EMBEDDING_DIM);
    }

    #[tokio::test]
    async fn test_embedding_is_normalized() {
        let emb = HashedEmbedding::default();
        let vec = emb.embed("the shipment leaves on monday").await.unwrap();
        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_embedding_deterministic() {
        let emb = HashedEmbedding::default();
        let v1 = emb.embed("carrier pickup window").await.unwrap();
        let v2 = emb.embed("carrier pickup window").await.unwrap();
        assert_eq!(v1, v2);
    }

    #[tokio::test]
    async fn test_similar_texts_score_higher() {
        let emb = HashedEmbedding::default();
        let v1 = emb.embed("freight rate confirmation sheet").await.unwrap();
        let v2 = emb.embed("freight rate confirmation document").await.unwrap();
        let v3 = emb.embed("weather forecast for tuesday").await.unwrap();

        let sim_12 = crate::cosine_similarity(&v1, &v2);
        let sim_13 = crate::cosine_similarity(&v1, &v3);
        assert!(
            sim_12 > sim_13,
            "related texts ({sim_12}) should score above unrelated ({sim_13})"
        );
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let emb = HashedEmbedding::default();
        assert!(emb.embed("   ").await.is_err());
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let emb = HashedEmbedding::default();
        let batch = emb.embed_batch(&["first text", "second text"]).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], emb.embed("first text").await.unwrap());
        assert_eq!(batch[1], emb.embed("second text").await.unwrap());
    }
}
