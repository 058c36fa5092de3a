//! Error types and result aliases for markerchat.
//!
//! [`ChatError`] covers everything that can go wrong talking to a completion
//! endpoint or loading configuration. Calculator failures are not errors in this
//! sense; they live in [`crate::tools::calculator::CalcError`] and are rendered
//! into the reply text.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;
