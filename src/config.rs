//! Runtime configuration read from the environment.
//!
//! `Config::from_env` loads a `.env` file first (if present), so secrets can
//! live there instead of the shell environment. A Gemini setup without
//! `GOOGLE_API_KEY` is rejected before any request is made.

use crate::error::{ChatError, Result};
use crate::llm::chat_session::PromptStyle;
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::gateways::{GeminiConfig, GeminiGateway, OllamaConfig, OllamaGateway};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    Ollama,
}

impl Provider {
    fn default_model(self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-1.5-pro",
            Provider::Ollama => "qwen3:32b",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub model: String,
    pub prompt_style: PromptStyle,
    pub completion: CompletionConfig,
    pub api_key: Option<String>,
    pub gemini_endpoint: Option<String>,
    pub ollama_host: Option<String>,
    pub timeout: Option<Duration>,
}

impl Config {
    /// Load `.env` (if any) and read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            info!("Loaded environment from {}", path.display());
        }

        Self::from_vars(&std::env::vars().collect())
    }

    /// Build a configuration from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let provider = match get("MARKERCHAT_PROVIDER").unwrap_or("gemini") {
            "gemini" => Provider::Gemini,
            "ollama" => Provider::Ollama,
            other => {
                return Err(ChatError::ConfigError(format!(
                    "unknown provider '{}' (expected 'gemini' or 'ollama')",
                    other
                )))
            }
        };

        let prompt_style = match get("MARKERCHAT_PROMPT_STYLE").unwrap_or("transcript") {
            "transcript" => PromptStyle::Transcript,
            "latest" | "latest_only" => PromptStyle::LatestOnly,
            other => {
                return Err(ChatError::ConfigError(format!(
                    "unknown prompt style '{}' (expected 'transcript' or 'latest')",
                    other
                )))
            }
        };

        let mut completion = CompletionConfig::default();
        if let Some(raw) = get("MARKERCHAT_TEMPERATURE") {
            completion.temperature = raw.parse().map_err(|_| {
                ChatError::ConfigError(format!("MARKERCHAT_TEMPERATURE is not a number: {}", raw))
            })?;
        }

        let timeout = match get("MARKERCHAT_TIMEOUT_SECS") {
            Some(raw) => Some(Duration::from_secs(raw.parse().map_err(|_| {
                ChatError::ConfigError(format!(
                    "MARKERCHAT_TIMEOUT_SECS is not a whole number: {}",
                    raw
                ))
            })?)),
            None => None,
        };

        let api_key = get("GOOGLE_API_KEY").map(String::from);
        if provider == Provider::Gemini && api_key.is_none() {
            return Err(ChatError::ConfigError(
                "Please set GOOGLE_API_KEY in the environment or a .env file".to_string(),
            ));
        }

        Ok(Self {
            provider,
            model: get("MARKERCHAT_MODEL").unwrap_or(provider.default_model()).to_string(),
            prompt_style,
            completion,
            api_key,
            gemini_endpoint: get("GEMINI_API_ENDPOINT").map(String::from),
            ollama_host: get("OLLAMA_HOST").map(String::from),
            timeout,
        })
    }

    /// Construct the gateway for the configured provider
    pub fn gateway(&self) -> Result<Arc<dyn LlmGateway>> {
        match self.provider {
            Provider::Gemini => {
                let defaults = GeminiConfig::default();
                let gateway = GeminiGateway::with_config(GeminiConfig {
                    api_key: self.api_key.clone().unwrap_or_default(),
                    base_url: self.gemini_endpoint.clone().unwrap_or(defaults.base_url),
                    timeout: self.timeout,
                })?;
                Ok(Arc::new(gateway))
            }
            Provider::Ollama => {
                let defaults = OllamaConfig::default();
                let gateway = OllamaGateway::with_config(OllamaConfig {
                    host: self.ollama_host.clone().unwrap_or(defaults.host),
                    timeout: self.timeout,
                })?;
                Ok(Arc::new(gateway))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let result = Config::from_vars(&vars(&[]));

        match result {
            Err(ChatError::ConfigError(msg)) => assert!(msg.contains("GOOGLE_API_KEY")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        assert!(Config::from_vars(&vars(&[("GOOGLE_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_gemini_defaults() {
        let config = Config::from_vars(&vars(&[("GOOGLE_API_KEY", "secret")])).unwrap();

        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.prompt_style, PromptStyle::Transcript);
        assert_eq!(config.completion.temperature, 1.0);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = Config::from_vars(&vars(&[
            ("MARKERCHAT_PROVIDER", "ollama"),
            ("OLLAMA_HOST", "http://gpu-box:11434"),
        ]))
        .unwrap();

        assert_eq!(config.provider, Provider::Ollama);
        assert_eq!(config.model, "qwen3:32b");
        assert_eq!(config.ollama_host.as_deref(), Some("http://gpu-box:11434"));
        assert!(config.gateway().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_vars(&vars(&[
            ("GOOGLE_API_KEY", "secret"),
            ("MARKERCHAT_MODEL", "gemini-2.0-flash"),
            ("MARKERCHAT_PROMPT_STYLE", "latest"),
            ("MARKERCHAT_TEMPERATURE", "0.2"),
            ("MARKERCHAT_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.prompt_style, PromptStyle::LatestOnly);
        assert_eq!(config.completion.temperature, 0.2);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let base = [("GOOGLE_API_KEY", "secret")];

        for (key, value) in [
            ("MARKERCHAT_PROVIDER", "bard"),
            ("MARKERCHAT_PROMPT_STYLE", "everything"),
            ("MARKERCHAT_TEMPERATURE", "warm"),
            ("MARKERCHAT_TIMEOUT_SECS", "-1"),
        ] {
            let mut pairs = base.to_vec();
            pairs.push((key, value));
            assert!(
                matches!(Config::from_vars(&vars(&pairs)), Err(ChatError::ConfigError(_))),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }

    #[test]
    fn test_gemini_gateway_from_config() {
        let config = Config::from_vars(&vars(&[
            ("GOOGLE_API_KEY", "secret"),
            ("GEMINI_API_ENDPOINT", "http://localhost:9999"),
        ]))
        .unwrap();

        assert!(config.gateway().is_ok());
    }
}
