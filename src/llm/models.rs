use serde::{Deserialize, Serialize};

/// Message role in a chat transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Message in a chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmMessage {
    #[serde(default = "default_role")]
    pub role: MessageRole,
    pub content: String,
}

fn default_role() -> MessageRole {
    MessageRole::User
}

impl LlmMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// What gets sent to a completion endpoint.
///
/// Some prompt styles flatten everything into one string, others send the
/// conversation as structured turns. Gateways accept both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Text(String),
    Turns(Vec<LlmMessage>),
}

impl Prompt {
    /// Number of turns the prompt carries (a text prompt counts as one)
    pub fn turn_count(&self) -> usize {
        match self {
            Prompt::Text(_) => 1,
            Prompt::Turns(turns) => turns.len(),
        }
    }
}
