//! Core types and error definitions for the Docsense document-intelligence
//! service.
//!
//! This crate provides the foundational types shared across all Docsense
//! crates: the unified error enum, the result alias, and the chunk types that
//! flow through ingestion, retrieval, and answering.
//!
//! # Main types
//!
//! - [`DocsenseError`]: Unified error enum for all Docsense subsystems.
//! - [`DocsenseResult`]: Convenience alias for `Result<T, DocsenseError>`.
//! - [`Chunk`]: A sentence-aligned slice of document text, the unit of
//!   retrieval.
//! - [`ScoredChunk`]: A chunk paired with its cosine similarity to a query.

use serde::{Deserialize, Serialize};

// --- Error types ---

/// Top-level error type for the Docsense service.
///
/// The first three variants form the request-facing taxonomy: `NotFound` and
/// `Validation` surface directly to the caller, while `Upstream` marks a
/// failed embedding or generation call that the boundary degrades rather than
/// drops. A blocked guardrail is not an error anywhere in this taxonomy; it is
/// an ordinary, successful outcome.
#[derive(Debug, thiserror::Error)]
pub enum DocsenseError {
    /// A document id that is absent from the index.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input: empty text, or an embedding dimension mismatch.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A failed call to the embedding or text-generation service.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from the HTTP gateway layer.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`DocsenseError`].
pub type DocsenseResult<T> = Result<T, DocsenseError>;

// --- Chunk types ---

/// A contiguous, sentence-aligned slice of document text used as the unit of
/// retrieval.
///
/// Chunks are created once at indexing time and never mutated. Within a
/// document, `index` is dense and unique, and `text` is non-empty after
/// trimming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk text: whole sentences joined with single spaces.
    pub text: String,
    /// 0-based position of this chunk within its document.
    pub index: usize,
    /// The document this chunk was cut from.
    pub document_id: String,
    /// Byte offset of the first verbatim occurrence of `text` in the source
    /// document. Best-effort: 0 when the joined text does not appear verbatim
    /// (e.g. after whitespace normalization). Diagnostic only; do not use it
    /// to reconstruct the source.
    pub char_start: usize,
    /// Reserved end offset, currently always 0.
    pub char_end: usize,
}

impl Chunk {
    /// Creates a chunk at the given index, locating `char_start` by searching
    /// for the chunk text verbatim in the source document.
    pub fn new(
        text: impl Into<String>,
        index: usize,
        document_id: impl Into<String>,
        source: &str,
    ) -> Self {
        let text = text.into();
        let char_start = source.find(&text).unwrap_or(0);
        Self {
            text,
            index,
            document_id: document_id.into(),
            char_start,
            char_end: 0,
        }
    }

    /// Number of whitespace-delimited words in the chunk text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// A retrieved chunk paired with its cosine similarity to the query, in
/// `[-1, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity between the query embedding and the chunk embedding.
    pub similarity: f32,
}
