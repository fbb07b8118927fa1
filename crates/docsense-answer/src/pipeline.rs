use crate::confidence;
use crate::generate::{build_prompt, keyword_answer, TextGenerator};
use crate::grounding::{GroundingValidator, GroundingVerdict};
use crate::guardrails::{GuardrailEvaluator, GuardrailReason};
use docsense_core::{Chunk, DocsenseResult};
use docsense_retrieval::Retriever;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// A retrieved chunk as surfaced to the API caller.
#[derive(Debug, Clone, Serialize)]
pub struct SourceText {
    /// The chunk text the answer drew from.
    pub text: String,
    /// Cosine similarity between the question and this chunk.
    pub similarity: f32,
    /// The chunk's position in the document.
    pub chunk_index: usize,
}

/// Everything a single ask produces.
#[derive(Debug, Clone, Serialize)]
pub struct AskOutcome {
    /// The generated answer, or the guardrail fallback message.
    pub answer: String,
    /// Retrieved context, empty when a guardrail blocked generation.
    pub source_text: Vec<SourceText>,
    /// Heuristic confidence in `[0, 1]`; 0.0 when blocked.
    pub confidence_score: f32,
    /// Whether a guardrail short-circuited generation.
    pub guardrail_triggered: bool,
    /// The blocking guardrail reason, when triggered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<GuardrailReason>,
    /// Post-hoc grounding verdict; absent when generation was blocked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grounding: Option<GroundingVerdict>,
}

/// The retrieve → guardrail → generate → score → validate flow for one
/// question against one indexed document.
///
/// Generation is optional: without a configured [`TextGenerator`] the
/// pipeline answers with keyword extraction over the retrieved context. A
/// failed generation call degrades to the same keyword answer instead of
/// surfacing the upstream error.
pub struct AnswerPipeline {
    retriever: Arc<Retriever>,
    generator: Option<Arc<dyn TextGenerator>>,
    guardrails: GuardrailEvaluator,
    grounding: GroundingValidator,
    top_k: usize,
}

impl AnswerPipeline {
    /// Creates a pipeline retrieving `top_k` chunks per question.
    pub fn new(
        retriever: Arc<Retriever>,
        generator: Option<Arc<dyn TextGenerator>>,
        guardrails: GuardrailEvaluator,
        top_k: usize,
    ) -> Self {
        Self {
            retriever,
            generator,
            guardrails,
            grounding: GroundingValidator,
            top_k,
        }
    }

    /// Answers `question` from the indexed document `document_id`.
    ///
    /// Fails with `NotFound` for an unknown document; guardrail blocks are
    /// returned as successful outcomes carrying the fallback message.
    pub async fn ask(&self, question: &str, document_id: &str) -> DocsenseResult<AskOutcome> {
        let retrieved = self
            .retriever
            .retrieve(question, document_id, self.top_k)
            .await?;

        let chunks: Vec<Chunk> = retrieved.iter().map(|s| s.chunk.clone()).collect();
        let scores: Vec<f32> = retrieved.iter().map(|s| s.similarity).collect();

        let verdict = self.guardrails.check(question, &chunks, &scores);
        if !verdict.allowed {
            info!(
                document_id = %document_id,
                reason = ?verdict.reason,
                "Guardrail blocked generation"
            );
            return Ok(AskOutcome {
                answer: verdict.message,
                source_text: Vec::new(),
                confidence_score: 0.0,
                guardrail_triggered: true,
                reason: Some(verdict.reason),
                grounding: None,
            });
        }

        let answer = match &self.generator {
            Some(generator) => {
                let prompt = build_prompt(question, &chunks);
                match generator.generate(&prompt).await {
                    Ok(answer) => answer,
                    Err(e) => {
                        // Degraded mode: log the outage and fall back.
                        warn!(
                            document_id = %document_id,
                            error = %e,
                            "Generation failed, degrading to keyword extraction"
                        );
                        keyword_answer(question, &chunks)
                    }
                }
            }
            None => keyword_answer(question, &chunks),
        };

        let confidence_score = confidence::score(&scores, &chunks, &answer);
        let grounding = self.grounding.validate(&answer, &chunks);

        let source_text = retrieved
            .into_iter()
            .map(|s| SourceText {
                text: s.chunk.text,
                similarity: s.similarity,
                chunk_index: s.chunk.index,
            })
            .collect();

        Ok(AskOutcome {
            answer,
            source_text,
            confidence_score,
            guardrail_triggered: false,
            reason: None,
            grounding: Some(grounding),
        })
    }
}
