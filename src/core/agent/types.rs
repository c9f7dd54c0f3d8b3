//! Agent types.
//!
//! Re-exports from agent-core, plus CLI-specific types.

pub use agent_core::types::{Content, ContentBlock, Message, Role, StopReason, Tool, Usage};

/// Events emitted during a session for terminal rendering
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// Text the model sent alongside a tool call
    Text(String),
    /// Tool invocation about to run
    ToolStart {
        name: String,
        /// Raw arguments as JSON text
        arguments: String,
    },
    /// Tool invocation with result
    ToolCall {
        name: String,
        invocation: String,
        output: String,
        is_error: bool,
    },
    /// Token usage for one model round
    Usage {
        input_tokens: u32,
        output_tokens: u32,
    },
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The model replied without a tool call.
    Answer(String),
    /// The round budget ran out while the model was still calling tools.
    BudgetExhausted { rounds: u32 },
}

impl Outcome {
    /// The final answer, if one was reached.
    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Answer(text) => Some(text),
            Self::BudgetExhausted { .. } => None,
        }
    }
}
