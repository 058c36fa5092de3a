use crate::protocol::{parse_reply, ParsedReply, ToolCall};
use crate::tools::calculator::{calculate, render_outcome};
use crate::tools::clock::{format_timestamp, Clock, SystemClock};
use std::sync::Arc;
use tracing::{info, warn};

/// Turns a parsed model reply into the text the user sees
#[derive(Clone)]
pub struct Dispatcher {
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Parse `raw` and dispatch it
    pub fn resolve(&self, raw: &str) -> String {
        self.dispatch(parse_reply(raw))
    }

    pub fn dispatch(&self, reply: ParsedReply) -> String {
        match reply {
            ParsedReply::Plain(text) => text,
            ParsedReply::Call(call) => {
                info!("Executing tool: {}", call.name());
                self.run(call)
            }
            ParsedReply::Malformed { raw, reason } => {
                warn!(reason = %reason, "Could not decode calculation request");
                format!("{}\nError processing calculation request: {}", raw, reason)
            }
        }
    }

    fn run(&self, call: ToolCall) -> String {
        match call {
            ToolCall::Time => format_timestamp(self.clock.now()),
            ToolCall::Calculate(payload) => {
                render_outcome(&calculate(&payload.operation, &payload.numbers))
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
