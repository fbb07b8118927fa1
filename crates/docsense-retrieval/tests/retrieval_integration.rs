#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for the docsense-retrieval crate.
//!
//! Covers the chunk → embed → index → retrieve flow with the real chunker and
//! the local hashing embedder, alignment invariants, and store lifecycle under
//! re-indexing.

use std::sync::Arc;

use docsense_ingest::Chunker;
use docsense_retrieval::{
    DocumentIndexer, DocumentStore, EmbeddingProvider, HashedEmbedding, Retriever,
};

const RATE_CONFIRMATION: &str = "Rate confirmation for load LD-2201. \
    Shipper is Acme Manufacturing in Columbus Ohio. \
    Consignee is Beta Distribution in Nashville Tennessee. \
    Pickup is scheduled for Monday at 8am. \
    The agreed rate is 500 dollars USD. \
    Equipment type is a dry van. \
    Carrier is Roadrunner Freight LLC.";

async fn index_fixture(store: &Arc<DocumentStore>, document_id: &str, text: &str) {
    let chunker = Chunker::default();
    let chunks = chunker.chunk(text, document_id);
    let indexer = DocumentIndexer::new(store.clone(), Arc::new(HashedEmbedding::default()));
    indexer
        .index_document(document_id, chunks, text.to_string())
        .await
        .unwrap();
}

#[tokio::test]
async fn indexed_entry_keeps_chunks_and_embeddings_aligned() {
    let store = Arc::new(DocumentStore::new());
    index_fixture(&store, "doc-1", RATE_CONFIRMATION).await;

    let entry = store.get("doc-1").await.unwrap();
    assert_eq!(entry.embeddings.len(), entry.chunks.len());
    for (i, chunk) in entry.chunks.iter().enumerate() {
        assert_eq!(chunk.index, i, "chunk indices must be dense and ordered");
        assert!(!chunk.text.trim().is_empty());
    }
}

#[tokio::test]
async fn retrieval_returns_descending_scores_within_top_k() {
    let store = Arc::new(DocumentStore::new());
    index_fixture(&store, "doc-1", RATE_CONFIRMATION).await;

    let retriever = Retriever::new(store, Arc::new(HashedEmbedding::default()));
    let results = retriever
        .retrieve("What is the agreed rate?", "doc-1", 3)
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert!(results.len() <= 3);
    for pair in results.windows(2) {
        assert!(
            pair[0].similarity >= pair[1].similarity,
            "scores must be non-increasing"
        );
    }
    for scored in &results {
        assert!(scored.similarity >= -1.0 && scored.similarity <= 1.0 + 1e-6);
    }
}

#[tokio::test]
async fn exact_chunk_text_query_scores_one() {
    let store = Arc::new(DocumentStore::new());
    index_fixture(&store, "doc-1", RATE_CONFIRMATION).await;

    let entry = store.get("doc-1").await.unwrap();
    let chunk_text = entry.chunks[0].text.clone();

    let retriever = Retriever::new(store, Arc::new(HashedEmbedding::default()));
    let results = retriever.retrieve(&chunk_text, "doc-1", 1).await.unwrap();
    assert!((results[0].similarity - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn full_text_survives_indexing_and_reindexing() {
    let store = Arc::new(DocumentStore::new());
    index_fixture(&store, "doc-1", RATE_CONFIRMATION).await;
    assert_eq!(
        store.full_text("doc-1").await.unwrap(),
        RATE_CONFIRMATION
    );

    let updated = "Amended rate confirmation. The agreed rate is 650 dollars.";
    index_fixture(&store, "doc-1", updated).await;
    assert_eq!(store.full_text("doc-1").await.unwrap(), updated);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn documents_are_isolated_per_id() {
    let store = Arc::new(DocumentStore::new());
    index_fixture(&store, "doc-a", "Shipment one ships Monday. Rate is 400 dollars.").await;
    index_fixture(&store, "doc-b", "Shipment two ships Friday. Rate is 900 dollars.").await;

    let retriever = Retriever::new(store.clone(), Arc::new(HashedEmbedding::default()));
    let results = retriever.retrieve("rate", "doc-a", 5).await.unwrap();
    for scored in results {
        assert_eq!(scored.chunk.document_id, "doc-a");
    }
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn embedder_batch_matches_singles_over_real_chunks() {
    let chunker = Chunker::default();
    let chunks = chunker.chunk(RATE_CONFIRMATION, "doc-1");
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();

    let embedder = HashedEmbedding::default();
    let batch = embedder.embed_batch(&texts).await.unwrap();
    for (text, from_batch) in texts.iter().zip(&batch) {
        assert_eq!(from_batch, &embedder.embed(text).await.unwrap());
    }
}
