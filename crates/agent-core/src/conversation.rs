//! Conversation state management.

use serde::{Deserialize, Serialize};

use crate::types::{Content, ContentBlock, Message, Role};

/// Append-only multi-turn conversation state.
///
/// A conversation lives for exactly one session and is never persisted.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
    system: Option<String>,
}

impl Conversation {
    /// Create a new conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation with a system prompt.
    #[must_use]
    pub fn with_system(system: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            system: Some(system.into()),
        }
    }

    /// Get the system prompt.
    #[must_use]
    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    /// Get all messages.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Add a user message.
    pub fn add_user_message(&mut self, text: impl Into<String>) {
        self.messages.push(Message {
            role: Role::User,
            content: Content::Text(text.into()),
        });
    }

    /// Add an assistant message.
    pub fn add_assistant_message(&mut self, text: impl Into<String>) {
        self.messages.push(Message {
            role: Role::Assistant,
            content: Content::Text(text.into()),
        });
    }

    /// Add an assistant message with content blocks (for tool use).
    pub fn add_assistant_blocks(&mut self, blocks: Vec<ContentBlock>) {
        self.messages.push(Message {
            role: Role::Assistant,
            content: Content::Blocks(blocks),
        });
    }

    /// Add a tool result.
    pub fn add_tool_result(&mut self, tool_use_id: String, content: String, is_error: bool) {
        let block = ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error: if is_error { Some(true) } else { None },
        };

        self.messages.push(Message {
            role: Role::Tool,
            content: Content::Blocks(vec![block]),
        });
    }

    /// Id of a tool use that has not been answered yet, if any.
    ///
    /// The model must never be queried while this returns `Some`.
    #[must_use]
    pub fn pending_tool_use(&self) -> Option<&str> {
        let mut pending: Vec<&str> = Vec::new();

        for message in &self.messages {
            for block in message.content.blocks() {
                match block {
                    ContentBlock::ToolUse { id, .. } => pending.push(id.as_str()),
                    ContentBlock::ToolResult { tool_use_id, .. } => {
                        pending.retain(|id| *id != tool_use_id.as_str());
                    }
                    ContentBlock::Text { .. } => {}
                }
            }
        }

        pending.first().copied()
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if the conversation has any messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
