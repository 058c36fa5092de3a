//! Chat front-end for hosted LLMs with marker-based tool calls.
//!
//! The model is taught to answer with `[CALL:get_time]` or
//! `[CALL:calculate] {...}` when it needs a tool. [`protocol`] recognizes those
//! markers, [`dispatch`] runs the matching tool from [`tools`], and
//! [`llm::ChatSession`] ties a completion endpoint and a transcript together.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod llm;
pub mod protocol;
pub mod tools;

pub use error::{ChatError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::{Config, Provider};
    pub use crate::dispatch::Dispatcher;
    pub use crate::error::{ChatError, Result};
    pub use crate::llm::gateways::{GeminiGateway, OllamaGateway};
    pub use crate::llm::{
        ChatSession, CompletionConfig, LlmBroker, LlmGateway, LlmMessage, MessageRole, Prompt,
        PromptStyle, Transcript,
    };
    pub use crate::protocol::{parse_reply, ParsedReply, ToolCall};
}
