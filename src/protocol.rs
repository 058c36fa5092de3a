//! The marker protocol the model uses to ask for a tool.
//!
//! A reply is a tool call only when, after leading whitespace, it starts with
//! one of the literal markers:
//!
//! ```text
//! [CALL:get_time]
//! [CALL:calculate] {"operation": "add", "numbers": [10, 20, 30]}
//! ```
//!
//! Anything after `[CALL:get_time]` is ignored. The text after
//! `[CALL:calculate]` must be exactly one JSON object with both fields; extra
//! prose, missing fields or bad JSON make the reply [`ParsedReply::Malformed`].
//! Markers that appear later in the reply are not recognized.

use crate::tools::calculator::Number;
use serde::Deserialize;

pub const TIME_MARKER: &str = "[CALL:get_time]";
pub const CALCULATE_MARKER: &str = "[CALL:calculate]";

/// Decoded `[CALL:calculate]` payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalculationPayload {
    pub operation: String,
    pub numbers: Vec<Number>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    Time,
    Calculate(CalculationPayload),
}

impl ToolCall {
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::Time => "get_time",
            ToolCall::Calculate(_) => "calculate",
        }
    }
}

/// A model reply after marker recognition
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedReply {
    /// No marker; the text is passed through untouched
    Plain(String),
    Call(ToolCall),
    /// A calculate marker whose payload did not decode
    Malformed { raw: String, reason: String },
}

pub fn parse_reply(raw: &str) -> ParsedReply {
    let body = raw.trim_start();

    if body.starts_with(TIME_MARKER) {
        return ParsedReply::Call(ToolCall::Time);
    }

    if let Some(rest) = body.strip_prefix(CALCULATE_MARKER) {
        return match serde_json::from_str::<CalculationPayload>(rest.trim()) {
            Ok(payload) => ParsedReply::Call(ToolCall::Calculate(payload)),
            Err(e) => ParsedReply::Malformed {
                raw: raw.to_string(),
                reason: e.to_string(),
            },
        };
    }

    ParsedReply::Plain(raw.to_string())
}
