use crate::error::Result;
use crate::llm::models::Prompt;
use async_trait::async_trait;

/// Configuration for LLM completion
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub temperature: f32,
    pub max_tokens: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_tokens: 8192,
        }
    }
}

/// Abstract interface for completion endpoints
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Complete a prompt and return the generated text
    async fn complete(&self, model: &str, prompt: &Prompt, config: &CompletionConfig)
        -> Result<String>;
}
