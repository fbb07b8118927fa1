use async_trait::async_trait;
use docsense_core::{Chunk, DocsenseError, DocsenseResult};
use serde::Deserialize;
use std::time::Duration;

/// The fixed answer used when no context sentence matches the question.
pub const MISSING_INFO_ANSWER: &str = "I cannot find this information in the document.";

/// Capability trait for the external text-generation call.
///
/// Prompt in, best-effort natural-language text out. Implementations do not
/// retry; a failed call surfaces as [`DocsenseError::Upstream`] and the
/// pipeline decides how to degrade.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates an answer for a fully-assembled prompt.
    async fn generate(&self, prompt: &str) -> DocsenseResult<String>;
}

/// Settings for the OpenRouter-backed generator.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Bearer token for the chat completions API. Empty means generation is
    /// not configured.
    #[serde(default)]
    pub api_key: String,
    /// Model identifier, e.g. `openai/gpt-3.5-turbo`.
    #[serde(default = "default_model_id")]
    pub model_id: String,
    /// API base URL without the `/v1/...` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sampling temperature; low for factual extraction.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Response token cap.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Hard upper bound on the request, after which the call fails.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model_id() -> String {
    "openai/gpt-3.5-turbo".to_string()
}

fn default_base_url() -> String {
    "https://openrouter.ai/api".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model_id: default_model_id(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// OpenAI-compatible chat completions backend (OpenRouter by default).
pub struct OpenRouterGenerator {
    config: GenerationConfig,
    http: reqwest::Client,
}

impl OpenRouterGenerator {
    /// Builds a generator with a client-level timeout from the config.
    pub fn new(config: GenerationConfig) -> DocsenseResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocsenseError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }
}

#[async_trait]
impl TextGenerator for OpenRouterGenerator {
    async fn generate(&self, prompt: &str) -> DocsenseResult<String> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let body = serde_json::json!({
            "model": self.config.model_id,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| DocsenseError::Upstream(e.to_string()))?;

        let status = resp.status();
        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| DocsenseError::Upstream(e.to_string()))?;

        if !status.is_success() {
            return Err(DocsenseError::Upstream(format!(
                "Generation API error {status}: {resp_body}"
            )));
        }

        resp_body["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                DocsenseError::Upstream(format!(
                    "Generation API returned no content: {resp_body}"
                ))
            })
    }
}

/// Assembles the answering prompt: instructions, retrieved context joined
/// with blank lines, then the question.
pub fn build_prompt(question: &str, context_chunks: &[Chunk]) -> String {
    let context = context_chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are an AI assistant that answers questions about logistics documents.\n\
         Answer ONLY based on the provided document context. If the answer is not \
         in the context, say \"I cannot find this information in the document.\"\n\n\
         Document Context:\n{context}\n\nQuestion: {question}\n\nAnswer:"
    )
}

/// Keyword fallback: picks the context sentence that hits the most question
/// keywords, or the fixed missing-info answer when nothing matches.
///
/// Used when no generator is configured and as the degraded mode when the
/// generation call fails.
pub fn keyword_answer(question: &str, context_chunks: &[Chunk]) -> String {
    let question_lower = question.to_lowercase();
    let keywords: Vec<&str> = question_lower.split_whitespace().collect();

    let mut best_sentence = "";
    let mut best_score = 0usize;

    for chunk in context_chunks {
        for sentence in chunk.text.split(". ") {
            let sentence_lower = sentence.to_lowercase();
            let score = keywords
                .iter()
                .filter(|k| sentence_lower.contains(**k))
                .count();
            if score > best_score {
                best_score = score;
                best_sentence = sentence;
            }
        }
    }

    if best_sentence.is_empty() {
        MISSING_INFO_ANSWER.to_string()
    } else {
        best_sentence.to_string()
    }
}
