//! Question answering over retrieved context: guardrails, generation,
//! confidence scoring, and grounding validation.
//!
//! The pipeline runs strictly in this order: retrieve → guardrail check →
//! generate → score → validate grounding. Generation is never attempted when
//! the guardrail blocks, and a blocked guardrail is a successful outcome that
//! carries a safe fallback message, not an error.
//!
//! # Main types
//!
//! - [`GuardrailEvaluator`]: Pre-generation sufficiency checks.
//! - [`TextGenerator`]: Capability trait for the external LLM call.
//! - [`OpenRouterGenerator`]: OpenAI-compatible chat completions backend.
//! - [`AnswerPipeline`]: End-to-end ask flow with degraded-mode fallback.

/// Heuristic answer confidence scoring.
pub mod confidence;
/// Text generation trait, OpenRouter backend, and keyword fallback.
pub mod generate;
/// Post-hoc answer grounding validation.
pub mod grounding;
/// Pre-generation guardrail checks.
pub mod guardrails;
/// The retrieve → guard → generate → score pipeline.
pub mod pipeline;

pub use generate::{
    build_prompt, keyword_answer, GenerationConfig, OpenRouterGenerator, TextGenerator,
    MISSING_INFO_ANSWER,
};
pub use grounding::{GroundingReason, GroundingValidator, GroundingVerdict};
pub use guardrails::{GuardrailConfig, GuardrailEvaluator, GuardrailReason, GuardrailVerdict};
pub use pipeline::{AnswerPipeline, AskOutcome, SourceText};
