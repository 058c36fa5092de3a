//! Gemini gateway for text completion.
//!
//! Talks to the Generative Language REST API (`models/{model}:generateContent`).
//! Assistant turns are sent with Gemini's `model` role.

use crate::error::{ChatError, Result};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::{LlmMessage, MessageRole, Prompt};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Configuration for connecting to the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Option<std::time::Duration>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("GOOGLE_API_KEY").unwrap_or_default(),
            base_url: std::env::var("GEMINI_API_ENDPOINT")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            timeout: None,
        }
    }
}

/// Gateway for Google's Gemini models.
pub struct GeminiGateway {
    client: Client,
    config: GeminiConfig,
}

impl GeminiGateway {
    /// Create a gateway with configuration taken from the environment.
    pub fn new() -> Result<Self> {
        Self::with_config(GeminiConfig::default())
    }

    /// Create a gateway with custom configuration.
    ///
    /// Fails with [`ChatError::ConfigError`] when no API key is present.
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ChatError::ConfigError(
                "a Gemini API key is required (set GOOGLE_API_KEY in the environment or .env)"
                    .to_string(),
            ));
        }

        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    /// Create gateway with custom API key and base URL.
    pub fn with_api_key_and_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(GeminiConfig {
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout: None,
        })
    }
}

#[async_trait]
impl LlmGateway for GeminiGateway {
    async fn complete(
        &self,
        model: &str,
        prompt: &Prompt,
        config: &CompletionConfig,
    ) -> Result<String> {
        info!("Delegating to Gemini for completion");
        debug!("Model: {}, Turn count: {}", model, prompt.turn_count());

        let body = serde_json::json!({
            "contents": adapt_prompt_to_gemini(prompt),
            "generationConfig": {
                "temperature": config.temperature,
                "maxOutputTokens": config.max_tokens,
            }
        });

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.config.base_url, model))
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChatError::GatewayError(format!(
                "Gemini API error: {} - {}",
                status, error_text
            )));
        }

        let response_body: Value = response.json().await?;
        extract_candidate_text(&response_body)
    }
}

fn gemini_role(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "model",
    }
}

fn gemini_turn(message: &LlmMessage) -> Value {
    serde_json::json!({
        "role": gemini_role(message.role),
        "parts": [{ "text": message.content }]
    })
}

// A text prompt is sent as a single user turn
fn adapt_prompt_to_gemini(prompt: &Prompt) -> Vec<Value> {
    match prompt {
        Prompt::Text(text) => vec![gemini_turn(&LlmMessage::user(text.as_str()))],
        Prompt::Turns(turns) => turns.iter().map(gemini_turn).collect(),
    }
}

fn extract_candidate_text(body: &Value) -> Result<String> {
    if let Some(reason) = body["promptFeedback"]["blockReason"].as_str() {
        warn!(block_reason = reason, "Gemini blocked the prompt");
        return Err(ChatError::ApiError(format!("prompt blocked: {}", reason)));
    }

    let parts = body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| ChatError::GatewayError("No candidate content in response".to_string()))?;

    let text: String = parts.iter().filter_map(|part| part["text"].as_str()).collect();

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_requires_api_key() {
        let result = GeminiGateway::with_api_key_and_base_url("", "http://localhost");

        match result {
            Err(ChatError::ConfigError(msg)) => assert!(msg.contains("GOOGLE_API_KEY")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_gateway_rejects_blank_api_key() {
        assert!(GeminiGateway::with_api_key_and_base_url("   ", "http://localhost").is_err());
    }

    #[test]
    fn test_adapt_text_prompt() {
        let contents = adapt_prompt_to_gemini(&Prompt::Text("hello".to_string()));

        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_adapt_turns_maps_assistant_to_model() {
        let prompt = Prompt::Turns(vec![LlmMessage::assistant("rules"), LlmMessage::user("hi")]);
        let contents = adapt_prompt_to_gemini(&prompt);

        assert_eq!(contents[0]["role"], "model");
        assert_eq!(contents[1]["role"], "user");
        assert_eq!(contents[1]["parts"][0]["text"], "hi");
    }

    #[test]
    fn test_extract_joins_parts() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}}]
        });

        assert_eq!(extract_candidate_text(&body).unwrap(), "Hello, world");
    }

    #[test]
    fn test_extract_blocked_prompt() {
        let body = serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}});

        match extract_candidate_text(&body) {
            Err(ChatError::ApiError(msg)) => assert_eq!(msg, "prompt blocked: SAFETY"),
            _ => panic!("Expected ApiError"),
        }
    }

    #[test]
    fn test_extract_missing_candidates() {
        let body = serde_json::json!({"candidates": []});
        assert!(extract_candidate_text(&body).is_err());
    }

    #[tokio::test]
    async fn test_complete_structured_turns() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-1.5-pro:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(mockito::Matcher::JsonString(
                r#"{"contents":[{"role":"model","parts":[{"text":"rules"}]},{"role":"user","parts":[{"text":"What time is it?"}]}],"generationConfig":{"temperature":1.0,"maxOutputTokens":8192}}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"[CALL:get_time]"}]}}]}"#)
            .create_async()
            .await;

        let gateway = GeminiGateway::with_api_key_and_base_url("test-key", server.url()).unwrap();
        let prompt =
            Prompt::Turns(vec![LlmMessage::assistant("rules"), LlmMessage::user("What time is it?")]);

        let result =
            gateway.complete("gemini-1.5-pro", &prompt, &CompletionConfig::default()).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "[CALL:get_time]");
    }

    #[tokio::test]
    async fn test_complete_error_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-1.5-pro:generateContent")
            .with_status(403)
            .with_body(r#"{"error":{"message":"API key not valid"}}"#)
            .create_async()
            .await;

        let gateway = GeminiGateway::with_api_key_and_base_url("bad-key", server.url()).unwrap();
        let prompt = Prompt::Text("hi".to_string());

        let result =
            gateway.complete("gemini-1.5-pro", &prompt, &CompletionConfig::default()).await;

        mock.assert_async().await;
        match result {
            Err(ChatError::GatewayError(msg)) => {
                assert!(msg.contains("403"));
                assert!(msg.contains("API key not valid"));
            }
            _ => panic!("Expected GatewayError"),
        }
    }
}
