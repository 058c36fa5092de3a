use crate::error::Result;
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::Prompt;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Binds a model name to a completion gateway
pub struct LlmBroker {
    model: String,
    gateway: Arc<dyn LlmGateway>,
}

impl LlmBroker {
    /// Create a new LLM broker
    pub fn new(model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            model: model.into(),
            gateway,
        }
    }

    /// Name of the model requests are sent to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a raw text reply from the LLM.
    ///
    /// Gateway failures are returned as-is; there is no retry.
    pub async fn generate(&self, prompt: &Prompt, config: Option<CompletionConfig>) -> Result<String> {
        let config = config.unwrap_or_default();
        let started = Instant::now();

        let reply = self.gateway.complete(&self.model, prompt, &config).await?;

        info!(
            model = %self.model,
            turns = prompt.turn_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            reply_len = reply.len(),
            "Completion received"
        );

        Ok(reply)
    }
}
