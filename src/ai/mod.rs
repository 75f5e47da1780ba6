//! AI text generation: the provider seam, prompts and response parsing.

mod gemini;
pub mod mock;
mod plan;
mod prompts;

pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
pub use plan::{extract_json_object, parse_learning_plan, Fallback, ParsedPlan, PlanParseError};
pub use prompts::{learning_plan_prompt, summary_prompt, LEARNING_OPTIONS, SUMMARY_OPTIONS};

use async_trait::async_trait;
use thiserror::Error;

/// Sampling parameters for a single request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI provider rate limit exceeded")]
    RateLimited,
    #[error("AI provider quota exhausted or service unavailable")]
    Unavailable,
    #[error("AI provider rejected credentials")]
    Unauthorized,
    #[error("AI provider rejected the request: {0}")]
    InvalidRequest(String),
    #[error("AI did not return any content")]
    EmptyResponse,
    #[error("AI provider error: {0}")]
    Provider(String),
    #[error("AI provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A prompt-in, text-out generation backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the trimmed text of the first candidate.
    async fn generate(&self, prompt: &str, options: GenerationOptions) -> Result<String, AiError>;

    fn model_name(&self) -> &str;
}

/// Used when no provider is configured; every request reports the service as unavailable.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str, _options: GenerationOptions) -> Result<String, AiError> {
        Err(AiError::Unavailable)
    }

    fn model_name(&self) -> &str {
        "disabled"
    }
}
