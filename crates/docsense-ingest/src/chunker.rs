use docsense_core::Chunk;
use serde::Deserialize;
use tracing::debug;

/// Tuning knobs for the [`Chunker`].
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkerConfig {
    /// Target chunk size in whitespace-delimited words.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Number of trailing sentences carried into the next chunk.
    #[serde(default = "default_overlap_sentences")]
    pub overlap_sentences: usize,
}

fn default_chunk_size() -> usize {
    500
}

fn default_overlap_sentences() -> usize {
    2
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap_sentences: default_overlap_sentences(),
        }
    }
}

/// Splits document text into overlapping, sentence-aligned chunks.
///
/// Sentences are accumulated greedily until adding the next one would push the
/// running word count past `chunk_size`; the chunk is then closed and the next
/// one is seeded with the last `overlap_sentences` sentences so context
/// survives the boundary. A single sentence longer than `chunk_size` is never
/// split mid-sentence; it is emitted alone, oversized. Sentence integrity
/// wins over strict size.
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Creates a chunker with the given configuration.
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Chunks `text` for the given document. Empty or whitespace-only input
    /// yields no chunks.
    pub fn chunk(&self, text: &str, document_id: &str) -> Vec<Chunk> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Vec::new();
        }

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_words = 0usize;

        for sentence in sentences {
            let sentence_words = sentence.split_whitespace().count();

            if current_words + sentence_words > self.config.chunk_size && !current.is_empty() {
                chunks.push(Chunk::new(current.join(" "), chunks.len(), document_id, text));

                // Seed the next chunk with the tail of the one just closed.
                let keep = self.config.overlap_sentences.min(current.len());
                let mut next: Vec<&str> = current[current.len() - keep..].to_vec();
                next.push(sentence);
                current_words = next
                    .iter()
                    .map(|s| s.split_whitespace().count())
                    .sum();
                current = next;
            } else {
                current.push(sentence);
                current_words += sentence_words;
            }
        }

        if !current.is_empty() {
            chunks.push(Chunk::new(current.join(" "), chunks.len(), document_id, text));
        }

        debug!(
            document_id = %document_id,
            chunks = chunks.len(),
            "Document chunked"
        );
        chunks
    }
}

/// Splits text into sentences at `.`, `!`, or `?` followed by whitespace.
///
/// A run of whitespace after a boundary counts as a single split point.
/// Fragments that are empty after trimming are discarded.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev_was_boundary = false;

    for (pos, ch) in text.char_indices() {
        if prev_was_boundary && ch.is_whitespace() {
            let fragment = text[start..pos].trim();
            if !fragment.is_empty() {
                sentences.push(fragment);
            }
            start = pos;
        }
        prev_was_boundary = matches!(ch, '.' | '!' | '?');
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}
