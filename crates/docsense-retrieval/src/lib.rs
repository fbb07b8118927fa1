//! Per-document vector indexing and cosine-similarity retrieval.
//!
//! Documents are chunked upstream, embedded in a single batched call, and held
//! in an injected in-memory [`DocumentStore`]. Retrieval is brute-force cosine
//! similarity over the chunks of one document; collections here are single
//! uploads, not corpora.
//!
//! # Main types
//!
//! - [`EmbeddingProvider`]: Capability trait for text-to-vector conversion.
//! - [`HashedEmbedding`]: Deterministic local embedding, no model download.
//! - [`DocumentStore`]: Injected store owning all indexed documents.
//! - [`DocumentIndexer`]: Embeds chunks and writes store entries.
//! - [`Retriever`]: Top-k cosine retrieval with deterministic tie-breaks.

/// Embedding provider trait and local hashing implementation.
pub mod embedding;
/// Indexing: batched embedding and entry creation.
pub mod index;
/// Top-k cosine similarity retrieval.
pub mod retriever;
/// Injected in-memory document store.
pub mod store;

pub use embedding::{EmbeddingProvider, HashedEmbedding, EMBEDDING_DIM};
pub use index::DocumentIndexer;
pub use retriever::{cosine_similarity, Retriever};
pub use store::{DocumentEntry, DocumentStore};
