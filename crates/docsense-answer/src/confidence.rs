//! Heuristic answer confidence.
//!
//! Blends retrieval similarity statistics with lexical answer/context overlap
//! into a single `[0, 1]` value. This is a heuristic blend, not a calibrated
//! probability; treat it as a ranking signal, not a likelihood.

use docsense_core::Chunk;
use std::collections::HashSet;

/// Phrases that mark an answer as admitting missing information.
const MISSING_PHRASES: [&str; 4] = ["cannot find", "not in", "not available", "not found"];

/// Number of top context chunks contributing coverage terms.
const COVERAGE_CHUNKS: usize = 2;

/// Number of leading words taken from each coverage chunk.
const COVERAGE_WORDS_PER_CHUNK: usize = 10;

/// Scores an answer against its retrieval context.
///
/// Returns 0.0 when `similarity_scores` is empty. Otherwise combines:
/// - the mean similarity (weight 0.6),
/// - an agreement boost in `[0.7, 1.0]` that rewards low score variance
///   (weight 0.2),
/// - a coverage boost up to 0.2 for answers that reuse the leading terms of
///   the top two context chunks,
/// and halves the result when the answer admits the information is missing.
pub fn score(similarity_scores: &[f32], context_chunks: &[Chunk], answer: &str) -> f32 {
    if similarity_scores.is_empty() {
        return 0.0;
    }

    let avg_similarity = mean(similarity_scores);
    let agreement_boost = 1.0 - std_dev(similarity_scores).min(0.3);

    let mut terms: HashSet<String> = HashSet::new();
    for chunk in context_chunks.iter().take(COVERAGE_CHUNKS) {
        for word in chunk
            .text
            .to_lowercase()
            .split_whitespace()
            .take(COVERAGE_WORDS_PER_CHUNK)
        {
            terms.insert(word.to_string());
        }
    }

    let answer_lower = answer.to_lowercase();
    let answer_words: HashSet<&str> = answer_lower.split_whitespace().collect();
    let covered = terms
        .iter()
        .filter(|term| answer_words.contains(term.as_str()))
        .count();
    let coverage = covered as f32 / terms.len().max(1) as f32;
    let coverage_boost = (coverage * 0.2).min(0.2);

    let penalty = if MISSING_PHRASES
        .iter()
        .any(|phrase| answer_lower.contains(phrase))
    {
        0.5
    } else {
        1.0
    };

    let confidence =
        (avg_similarity * 0.6 + agreement_boost * 0.2 + coverage_boost).clamp(0.0, 1.0) * penalty;
    confidence.clamp(0.0, 1.0)
}

fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

/// Population standard deviation.
fn std_dev(values: &[f32]) -> f32 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f32>() / values.len() as f32;
    variance.sqrt()
}
