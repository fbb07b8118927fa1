use docsense_core::Chunk;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Why a guardrail check passed or blocked answer generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailReason {
    /// All checks passed; generation may proceed.
    Passed,
    /// Retrieval produced no chunks at all.
    NoRelevantChunks,
    /// The best similarity score is below the threshold.
    LowSimilarity,
    /// Fewer chunks than the configured minimum.
    InsufficientChunks,
    /// Not enough chunks of meaningful length (likely noise).
    ChunksTooShort,
}

/// Outcome of the pre-generation guardrail check.
///
/// Produced per question and consumed immediately. `message` is the exact
/// user-facing string returned when `allowed` is false; the strings are part
/// of the interface contract toward API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailVerdict {
    /// Whether answer generation may be attempted.
    pub allowed: bool,
    /// User-facing fallback message when blocked; empty when passed.
    pub message: String,
    /// The first rule that matched.
    pub reason: GuardrailReason,
    /// The max similarity, carried only on [`GuardrailReason::LowSimilarity`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f32>,
}

impl GuardrailVerdict {
    fn blocked(reason: GuardrailReason, message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            message: message.into(),
            reason,
            similarity_score: None,
        }
    }
}

/// Thresholds for the guardrail rules.
#[derive(Debug, Clone, Deserialize)]
pub struct GuardrailConfig {
    /// Minimum acceptable max-similarity before an answer is attempted.
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,
    /// Minimum number of retrieved chunks required.
    #[serde(default = "default_min_chunks")]
    pub min_chunks: usize,
    /// Minimum whitespace-delimited words for a chunk to count as meaningful.
    #[serde(default = "default_min_chunk_words")]
    pub min_chunk_words: usize,
}

fn default_min_similarity() -> f32 {
    0.3
}

fn default_min_chunks() -> usize {
    1
}

fn default_min_chunk_words() -> usize {
    5
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            min_similarity: default_min_similarity(),
            min_chunks: default_min_chunks(),
            min_chunk_words: default_min_chunk_words(),
        }
    }
}

/// Decides whether retrieved context is sufficient to attempt an answer.
///
/// Evaluated strictly before generation; a blocked verdict short-circuits the
/// pipeline with a fixed fallback message. Blocking is a first-class outcome,
/// never an error.
#[derive(Debug, Clone, Default)]
pub struct GuardrailEvaluator {
    config: GuardrailConfig,
}

impl GuardrailEvaluator {
    /// Creates an evaluator with the given thresholds.
    pub fn new(config: GuardrailConfig) -> Self {
        Self { config }
    }

    /// Runs the guardrail rules in order; the first match wins.
    pub fn check(
        &self,
        question: &str,
        chunks: &[Chunk],
        similarity_scores: &[f32],
    ) -> GuardrailVerdict {
        // Rule 1: no retrieved context at all.
        if chunks.is_empty() {
            debug!(question = %question, "Guardrail: no relevant chunks");
            return GuardrailVerdict::blocked(
                GuardrailReason::NoRelevantChunks,
                "I cannot find relevant information in the document to answer this question.",
            );
        }

        // Rule 2: best match is below the relevance threshold.
        if !similarity_scores.is_empty() {
            let max_similarity = similarity_scores.iter().copied().fold(f32::MIN, f32::max);
            if max_similarity < self.config.min_similarity {
                debug!(question = %question, max_similarity, "Guardrail: low similarity");
                return GuardrailVerdict {
                    allowed: false,
                    message: format!(
                        "I cannot find this information in the document. \
                         The retrieved content has low relevance (similarity: {max_similarity:.2})."
                    ),
                    reason: GuardrailReason::LowSimilarity,
                    similarity_score: Some(max_similarity),
                };
            }
        }

        // Rule 3: fewer chunks than required.
        if chunks.len() < self.config.min_chunks {
            return GuardrailVerdict::blocked(
                GuardrailReason::InsufficientChunks,
                "Insufficient context found in the document to provide a reliable answer.",
            );
        }

        // Rule 4: chunks present but too short to mean anything.
        let meaningful = chunks
            .iter()
            .filter(|c| c.word_count() >= self.config.min_chunk_words)
            .count();
        if meaningful < self.config.min_chunks {
            return GuardrailVerdict::blocked(
                GuardrailReason::ChunksTooShort,
                "The retrieved document sections are too short to provide a meaningful answer.",
            );
        }

        GuardrailVerdict {
            allowed: true,
            message: String::new(),
            reason: GuardrailReason::Passed,
            similarity_score: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn chunk(text: &str, index: usize) -> Chunk {
        Chunk::new(text, index, "doc-1", text)
    }

    #[test]
    fn test_empty_chunks_blocks_with_no_relevant_chunks() {
        let evaluator = GuardrailEvaluator::default();
        let verdict = evaluator.check("What is the rate?", &[], &[]);
        assert!(!verdict.allowed);
        assert_eq!(verdict.reason, GuardrailReason::NoRelevantChunks);
        assert_eq!(
            verdict.message,
            "I cannot find relevant information in the document to answer this question."
        );
    }

    #[test]
    fn test_strong_scores_pass() {
        let evaluator = GuardrailEvaluator::default();
        let chunks = vec![
            chunk("The agreed freight rate is five hundred dollars.", 0),
            chunk("Pickup is scheduled for Monday morning at eight.", 1),
        ];
        let verdict = evaluator.check("What is the rate?", &chunks, &[0.9, 0.85]);
        assert!(verdict.allowed);
        assert_eq!(verdict.reason, GuardrailReason::Passed);
        assert!(verdict.message.is_empty());
    }

    #[test]
    fn test_low_similarity_blocks_and_reports_max() {
        let evaluator = GuardrailEvaluator::default();
        let chunks = vec![chunk("Some unrelated paragraph about office hours.", 0)];
        let verdict = evaluator.check("What is the rate?", &chunks, &[0.1]);
        assert!(!verdict.allowed);
        assert_eq!(verdict.reason, GuardrailReason::LowSimilarity);
        assert_eq!(verdict.similarity_score, Some(0.1));
        assert_eq!(
            verdict.message,
            "I cannot find this information in the document. \
             The retrieved content has low relevance (similarity: 0.10)."
        );
    }

    #[test]
    fn test_low_similarity_uses_max_score() {
        let evaluator = GuardrailEvaluator::default();
        let chunks = vec![chunk("Words that fill out a full sentence here.", 0)];
        let verdict = evaluator.check("q", &chunks, &[0.05, 0.25, 0.1]);
        assert_eq!(verdict.similarity_score, Some(0.25));
    }

    #[test]
    fn test_boundary_similarity_passes() {
        // 0.3 is not below the 0.3 threshold.
        let evaluator = GuardrailEvaluator::default();
        let chunks = vec![chunk("A sentence with enough meaningful words inside.", 0)];
        let verdict = evaluator.check("q", &chunks, &[0.3]);
        assert!(verdict.allowed);
    }

    #[test]
    fn test_short_chunks_block() {
        let evaluator = GuardrailEvaluator::default();
        let chunks = vec![chunk("too short", 0), chunk("also tiny", 1)];
        let verdict = evaluator.check("q", &chunks, &[0.8, 0.7]);
        assert!(!verdict.allowed);
        assert_eq!(verdict.reason, GuardrailReason::ChunksTooShort);
        assert_eq!(
            verdict.message,
            "The retrieved document sections are too short to provide a meaningful answer."
        );
    }

    #[test]
    fn test_one_meaningful_chunk_is_enough() {
        let evaluator = GuardrailEvaluator::default();
        let chunks = vec![
            chunk("ok", 0),
            chunk("This chunk has plenty of words to matter.", 1),
        ];
        let verdict = evaluator.check("q", &chunks, &[0.6, 0.5]);
        assert!(verdict.allowed);
    }

    #[test]
    fn test_insufficient_chunks_with_raised_minimum() {
        let evaluator = GuardrailEvaluator::new(GuardrailConfig {
            min_chunks: 2,
            ..GuardrailConfig::default()
        });
        let chunks = vec![chunk("A single chunk with enough words present.", 0)];
        let verdict = evaluator.check("q", &chunks, &[0.9]);
        assert!(!verdict.allowed);
        assert_eq!(verdict.reason, GuardrailReason::InsufficientChunks);
        assert_eq!(
            verdict.message,
            "Insufficient context found in the document to provide a reliable answer."
        );
    }

    #[test]
    fn test_reason_serializes_snake_case() {
        let json = serde_json::to_string(&GuardrailReason::NoRelevantChunks).unwrap();
        assert_eq!(json, "\"no_relevant_chunks\"");
    }
}
