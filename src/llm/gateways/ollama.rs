use crate::error::{ChatError, Result};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::models::Prompt;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

/// Configuration for connecting to Ollama server
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
    pub timeout: Option<std::time::Duration>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("OLLAMA_HOST")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            timeout: None,
        }
    }
}

/// Gateway for Ollama local LLM service
///
/// Structured turns go to `/api/chat`, flat text prompts to `/api/generate`.
pub struct OllamaGateway {
    client: Client,
    config: OllamaConfig,
}

impl OllamaGateway {
    /// Create a new Ollama gateway with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(OllamaConfig::default())
    }

    /// Create a new Ollama gateway with custom configuration
    pub fn with_config(config: OllamaConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    /// Create gateway with custom host
    pub fn with_host(host: impl Into<String>) -> Result<Self> {
        Self::with_config(OllamaConfig {
            host: host.into(),
            ..Default::default()
        })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let response =
            self.client.post(format!("{}{}", self.config.host, path)).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ChatError::GatewayError(format!(
                "Ollama API error: {} - {}",
                status, error_text
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    async fn complete(
        &self,
        model: &str,
        prompt: &Prompt,
        config: &CompletionConfig,
    ) -> Result<String> {
        info!("Delegating to Ollama for completion");
        debug!("Model: {}, Turn count: {}", model, prompt.turn_count());

        let options = extract_ollama_options(config);

        match prompt {
            Prompt::Text(text) => {
                let body = serde_json::json!({
                    "model": model,
                    "prompt": text,
                    "options": options,
                    "stream": false
                });

                let response_body = self.post("/api/generate", &body).await?;

                response_body["response"].as_str().map(String::from).ok_or_else(|| {
                    ChatError::GatewayError("No response text in Ollama reply".to_string())
                })
            }
            Prompt::Turns(turns) => {
                // LlmMessage already serializes as Ollama's {"role", "content"}
                let messages = serde_json::to_value(turns)?;

                let body = serde_json::json!({
                    "model": model,
                    "messages": messages,
                    "options": options,
                    "stream": false
                });

                let response_body = self.post("/api/chat", &body).await?;

                response_body["message"]["content"].as_str().map(String::from).ok_or_else(|| {
                    ChatError::GatewayError("No message content in Ollama reply".to_string())
                })
            }
        }
    }
}

// Extract Ollama-specific options from config
fn extract_ollama_options(config: &CompletionConfig) -> Value {
    let mut options = serde_json::json!({
        "temperature": config.temperature,
    });

    if config.max_tokens > 0 {
        options["num_predict"] = serde_json::json!(config.max_tokens);
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::models::LlmMessage;

    #[test]
    fn test_ollama_config_custom() {
        let config = OllamaConfig {
            host: "http://custom:8080".to_string(),
            timeout: Some(std::time::Duration::from_secs(30)),
        };

        assert_eq!(config.host, "http://custom:8080");
        assert_eq!(config.timeout, Some(std::time::Duration::from_secs(30)));
        assert!(OllamaGateway::with_config(config).is_ok());
    }

    #[test]
    fn test_extract_options() {
        let config = CompletionConfig {
            temperature: 0.5,
            max_tokens: 100,
        };

        let options = extract_ollama_options(&config);
        assert_eq!(options["temperature"], 0.5);
        assert_eq!(options["num_predict"], 100);
    }

    #[test]
    fn test_extract_options_without_token_limit() {
        let config = CompletionConfig {
            temperature: 1.0,
            max_tokens: 0,
        };

        let options = extract_ollama_options(&config);
        assert!(options.get("num_predict").is_none());
    }

    #[tokio::test]
    async fn test_complete_turns() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(mockito::Matcher::JsonString(
                r#"{"model":"qwen3:32b","messages":[{"role":"assistant","content":"rules"},{"role":"user","content":"Hi"}],"options":{"temperature":1.0,"num_predict":8192},"stream":false}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"message":{"role":"assistant","content":"Hello!"}}"#)
            .create_async()
            .await;

        let gateway = OllamaGateway::with_host(server.url()).unwrap();
        let prompt = Prompt::Turns(vec![LlmMessage::assistant("rules"), LlmMessage::user("Hi")]);

        let result = gateway.complete("qwen3:32b", &prompt, &CompletionConfig::default()).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "Hello!");
    }

    #[tokio::test]
    async fn test_complete_text_uses_generate() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .with_status(200)
            .with_body(r#"{"response":"[CALL:get_time]","done":true}"#)
            .create_async()
            .await;

        let gateway = OllamaGateway::with_host(server.url()).unwrap();
        let prompt = Prompt::Text("rules\nUser: time?".to_string());

        let result = gateway.complete("qwen3:32b", &prompt, &CompletionConfig::default()).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "[CALL:get_time]");
    }

    #[tokio::test]
    async fn test_complete_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/api/chat").with_status(500).create_async().await;

        let gateway = OllamaGateway::with_host(server.url()).unwrap();
        let prompt = Prompt::Turns(vec![LlmMessage::user("Hi")]);

        let result = gateway.complete("qwen3:32b", &prompt, &CompletionConfig::default()).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(ChatError::GatewayError(_))));
    }

    #[tokio::test]
    async fn test_complete_error_includes_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body(r#"{"error":"model 'qwen3:32b' not found"}"#)
            .create_async()
            .await;

        let gateway = OllamaGateway::with_host(server.url()).unwrap();
        let prompt = Prompt::Text("hi".to_string());

        let result = gateway.complete("qwen3:32b", &prompt, &CompletionConfig::default()).await;

        mock.assert_async().await;
        match result {
            Err(ChatError::GatewayError(msg)) => {
                assert!(msg.contains("404"));
                assert!(msg.contains("model 'qwen3:32b' not found"));
            }
            _ => panic!("Expected GatewayError"),
        }
    }
}
