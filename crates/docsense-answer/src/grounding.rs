use docsense_core::Chunk;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Phrases in a generated answer that concede the information is missing.
const MISSING_PHRASES: [&str; 5] = [
    "cannot find",
    "not in the document",
    "not available",
    "not found",
    "not mentioned",
];

/// Leading words taken from each context chunk for the overlap check.
const CONTEXT_WORDS_PER_CHUNK: usize = 50;

/// Minimum answer/context word overlap ratio to count as grounded.
const MIN_OVERLAP_RATIO: f32 = 0.1;

/// Why an answer failed the grounding check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundingReason {
    /// The answer itself concedes the information is missing.
    AnswerIndicatesMissingInfo,
    /// The answer shares too few words with the retrieved context.
    LowWordOverlap,
}

/// Result of the post-hoc grounding check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingVerdict {
    /// Whether the answer appears supported by the retrieved context.
    pub grounded: bool,
    /// Failure reason when not grounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<GroundingReason>,
    /// The measured overlap ratio; absent on the missing-info short-circuit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap_ratio: Option<f32>,
}

/// Post-hoc check that a generated answer is supported by retrieved context
/// rather than fabricated.
///
/// Purely lexical: a crude tripwire against hallucinated answers, not a
/// semantic entailment check.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroundingValidator;

impl GroundingValidator {
    /// Validates `answer` against the chunks it was generated from.
    pub fn validate(&self, answer: &str, context_chunks: &[Chunk]) -> GroundingVerdict {
        let answer_lower = answer.to_lowercase();

        if MISSING_PHRASES
            .iter()
            .any(|phrase| answer_lower.contains(phrase))
        {
            return GroundingVerdict {
                grounded: false,
                reason: Some(GroundingReason::AnswerIndicatesMissingInfo),
                overlap_ratio: None,
            };
        }

        let mut context_words: HashSet<String> = HashSet::new();
        for chunk in context_chunks {
            for word in chunk
                .text
                .to_lowercase()
                .split_whitespace()
                .take(CONTEXT_WORDS_PER_CHUNK)
            {
                context_words.insert(word.to_string());
            }
        }

        let answer_words: HashSet<&str> = answer_lower.split_whitespace().collect();
        let overlap = answer_words
            .iter()
            .filter(|w| context_words.contains(**w))
            .count();
        let overlap_ratio = overlap as f32 / answer_words.len().max(1) as f32;

        if overlap_ratio < MIN_OVERLAP_RATIO {
            GroundingVerdict {
                grounded: false,
                reason: Some(GroundingReason::LowWordOverlap),
                overlap_ratio: Some(overlap_ratio),
            }
        } else {
            GroundingVerdict {
                grounded: true,
                reason: None,
                overlap_ratio: Some(overlap_ratio),
            }
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
    fn test_missing_info_answer_short_circuits() {
        let validator = GroundingValidator;
        let chunks = vec![chunk("the rate is 500 dollars", 0)];
        let verdict = validator.validate("I cannot find this information", &chunks);
        assert!(!verdict.grounded);
        assert_eq!(
            verdict.reason,
            Some(GroundingReason::AnswerIndicatesMissingInfo)
        );
        assert!(verdict.overlap_ratio.is_none());
    }

    #[test]
    fn test_missing_info_wins_regardless_of_context() {
        let validator = GroundingValidator;
        // Even with empty context the phrase check fires first.
        let verdict = validator.validate("This detail is not mentioned anywhere.", &[]);
        assert_eq!(
            verdict.reason,
            Some(GroundingReason::AnswerIndicatesMissingInfo)
        );
    }

    #[test]
    fn test_overlapping_answer_is_grounded() {
        let validator = GroundingValidator;
        let chunks = vec![chunk("The agreed rate for this load is 500 dollars.", 0)];
        let verdict = validator.validate("The rate is 500 dollars.", &chunks);
        assert!(verdict.grounded);
        assert!(verdict.reason.is_none());
        assert!(verdict.overlap_ratio.unwrap() >= MIN_OVERLAP_RATIO);
    }

    #[test]
    fn test_disjoint_answer_is_ungrounded() {
        let validator = GroundingValidator;
        let chunks = vec![chunk("The agreed rate for this load is 500 dollars.", 0)];
        let verdict = validator.validate("Bananas grow plentifully near equatorial climates", &chunks);
        assert!(!verdict.grounded);
        assert_eq!(verdict.reason, Some(GroundingReason::LowWordOverlap));
        assert!(verdict.overlap_ratio.unwrap() < MIN_OVERLAP_RATIO);
    }

    #[test]
    fn test_empty_answer_is_ungrounded() {
        let validator = GroundingValidator;
        let verdict = validator.validate("", &[chunk("some context words here", 0)]);
        assert!(!verdict.grounded);
        assert_eq!(verdict.overlap_ratio, Some(0.0));
    }
}
