//! Conversation rounds over an explicitly owned transcript.
//!
//! A [`ChatSession`] holds everything that stays fixed for a conversation
//! (broker, system instruction, prompt style). The [`Transcript`] is owned by the
//! caller and lent to [`ChatSession::send`] for each round, so whoever hosts the
//! chat decides where the history lives.

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::llm::broker::LlmBroker;
use crate::llm::gateway::CompletionConfig;
use crate::llm::models::{LlmMessage, Prompt};
use tracing::debug;

/// First message of every new transcript
pub const GREETING: &str = "Hello! How can I assist you today?";

/// Instruction that teaches the model the tool markers
pub const SYSTEM_PROMPT: &str = r#"
You are a specialized AI conversational assistant that can perform calculations and retrieve the current date and time using function calls.

Capabilities:
1. **Mathematical Calculations**: You can add, subtract, multiply, or divide numbers when requested.
   - Supported operations: `"add"`, `"subtract"`, `"multiply"`, `"divide"`.
   - You will return an error if division by zero is attempted or if invalid inputs are provided.
   - The function expects a JSON format: `{"operation": "add", "numbers": [4, 5, 6]}`.

2. **Fetching the Current Time**: You can provide the current date and time in `"YYYY-MM-DD HH:MM:SS"` format.
3. **Giving back Previous Messages**: You can provide the previous messages in the chat history which happened in this conversation.
Rules:
- If the user asks for any **calculation**, invoke the `calculate` function.
- If the user asks for the **current time**, invoke the `get_time` function.
- If the user asks for the previous messages, give the user the previous respective messages.
- If the user's question is unrelated to calculations or time, inform them that you can only perform these tasks.

When you need to call a function, respond in the following format:

**For calculations:**
[CALL:calculate] {"operation": "add", "numbers": [10, 20, 30]}
**For getting the time:**
[CALL:get_time]

Do **not** answer queries unrelated to calculations or time or previous messages.
"#;

/// How the conversation is presented to the completion endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptStyle {
    /// The system instruction as an assistant turn, followed by the whole transcript
    #[default]
    Transcript,
    /// One text prompt: the system instruction plus the latest user input
    LatestOnly,
}

/// Ordered, append-only conversation history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<LlmMessage>,
}

impl Transcript {
    /// A new transcript seeded with the assistant greeting
    pub fn new() -> Self {
        Self {
            messages: vec![LlmMessage::assistant(GREETING)],
        }
    }

    pub fn push(&mut self, message: LlmMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[LlmMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&LlmMessage> {
        self.messages.last()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one request/response round per user input.
///
/// # Examples
///
/// ```ignore
/// use markerchat::llm::{ChatSession, LlmBroker, Transcript};
/// use markerchat::llm::gateways::GeminiGateway;
/// use std::sync::Arc;
///
/// let broker = LlmBroker::new("gemini-1.5-pro", Arc::new(GeminiGateway::new()?));
/// let session = ChatSession::new(broker);
/// let mut transcript = Transcript::new();
///
/// let reply = session.send(&mut transcript, "What is 6 times 7?").await?;
/// ```
pub struct ChatSession {
    broker: LlmBroker,
    system_prompt: String,
    prompt_style: PromptStyle,
    config: CompletionConfig,
    dispatcher: Dispatcher,
}

impl ChatSession {
    /// Create a chat session with the default system prompt and style
    pub fn new(broker: LlmBroker) -> Self {
        Self::builder(broker).build()
    }

    pub fn builder(broker: LlmBroker) -> ChatSessionBuilder {
        ChatSessionBuilder::new(broker)
    }

    pub fn prompt_style(&self) -> PromptStyle {
        self.prompt_style
    }

    /// Complete one round.
    ///
    /// The user message is appended first. If the endpoint fails the error is
    /// returned and the transcript keeps the user message without a reply.
    pub async fn send(&self, transcript: &mut Transcript, input: &str) -> Result<String> {
        transcript.push(LlmMessage::user(input));

        let prompt = self.build_prompt(transcript, input);
        let raw = self.broker.generate(&prompt, Some(self.config.clone())).await?;
        debug!(raw_reply = %raw, "Model reply");

        let reply = self.dispatcher.resolve(&raw);
        transcript.push(LlmMessage::assistant(reply.as_str()));

        Ok(reply)
    }

    /// Build the outbound prompt for the current transcript
    pub fn build_prompt(&self, transcript: &Transcript, input: &str) -> Prompt {
        match self.prompt_style {
            PromptStyle::Transcript => {
                let mut turns = Vec::with_capacity(transcript.len() + 1);
                turns.push(LlmMessage::assistant(self.system_prompt.as_str()));
                turns.extend(transcript.messages().iter().cloned());
                Prompt::Turns(turns)
            }
            PromptStyle::LatestOnly => {
                Prompt::Text(format!("{}\nUser: {}", self.system_prompt, input))
            }
        }
    }
}

/// Builder for constructing a `ChatSession` with custom configuration.
pub struct ChatSessionBuilder {
    broker: LlmBroker,
    system_prompt: String,
    prompt_style: PromptStyle,
    config: CompletionConfig,
    dispatcher: Option<Dispatcher>,
}

impl ChatSessionBuilder {
    fn new(broker: LlmBroker) -> Self {
        Self {
            broker,
            system_prompt: SYSTEM_PROMPT.to_string(),
            prompt_style: PromptStyle::default(),
            config: CompletionConfig::default(),
            dispatcher: None,
        }
    }

    /// Replace the tool instruction sent ahead of the conversation
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn prompt_style(mut self, style: PromptStyle) -> Self {
        self.prompt_style = style;
        self
    }

    /// Set the temperature for generation (default: 1.0)
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn completion_config(mut self, config: CompletionConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a specific dispatcher (e.g. one with a fixed clock)
    pub fn dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn build(self) -> ChatSession {
        ChatSession {
            broker: self.broker,
            system_prompt: self.system_prompt,
            prompt_style: self.prompt_style,
            config: self.config,
            dispatcher: self.dispatcher.unwrap_or_default(),
        }
    }
}
