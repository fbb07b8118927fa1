//! Document ingestion: sentence-aligned chunking and document-id derivation.
//!
//! Splits already-extracted plain text into overlapping retrieval chunks.
//! Binary format parsing (PDF, DOCX) happens upstream of this crate; the
//! ingest boundary receives a plain string and a caller-supplied filename.
//!
//! # Main types
//!
//! - [`Chunker`]: Greedy sentence accumulator with sentence-level overlap.
//! - [`ChunkerConfig`]: Chunk size and overlap tuning.
//! - [`derive_document_id`]: Content-addressed document id.

/// Sentence-aligned chunker.
pub mod chunker;

pub use chunker::{split_sentences, Chunker, ChunkerConfig};

use sha2::{Digest, Sha256};

/// Derives a stable document id from the raw file bytes and the filename.
///
/// The id is the hex-encoded SHA-256 of `content || filename`, so re-uploading
/// the same file yields the same id and re-indexing replaces the prior entry.
pub fn derive_document_id(content: &[u8], filename: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hasher.update(filename.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_deterministic() {
        let a = derive_document_id(b"rate confirmation", "rc.txt");
        let b = derive_document_id(b"rate confirmation", "rc.txt");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_document_id_differs_by_filename() {
        let a = derive_document_id(b"same bytes", "one.txt");
        let b = derive_document_id(b"same bytes", "two.txt");
        assert_ne!(a, b);
    }
}
