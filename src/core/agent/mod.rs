//! Tool-calling agent loop.

pub mod catalog;
mod dispatch;
pub mod tools;
mod types;

use std::collections::HashMap;

use futures::StreamExt;

pub use agent_core::conversation::Conversation;
pub use agent_core::error::{AgentError, Result};
pub use agent_core::provider::{CompletionEvent, CompletionRequest, CompletionStream, LlmProvider};
pub use agent_core::providers::{Backend, ProviderSettings, UnifiedProvider};
pub use dispatch::{ArgValue, Dispatcher, ToolArgs, ToolCall};
pub use tools::{ScriptRunner, ToolError, ToolResult};
pub use types::{
    ChatEvent, Content, ContentBlock, Message, Outcome, Role, StopReason, Tool, Usage,
};

/// Default number of model rounds per session.
pub const DEFAULT_MAX_ROUNDS: u32 = 20;

/// System prompt used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a helpful AI coding agent.

When a user asks a question or makes a request, make a function call plan. \
You can perform the following operations:

- List files and directories
- Read file contents
- Execute Python or shell scripts with optional arguments
- Write or overwrite files

All paths you provide should be relative to the working directory. \
You do not need to specify the working directory in your function calls; \
it is injected automatically for security reasons.

Call one function at a time and wait for its result before deciding the next step. \
When you are done, answer in plain text without calling a function.";

enum LoopState {
    AwaitingModel,
    ExecutingTool(ToolCall),
    Done(Outcome),
}

/// Agent that drives one session against a sandboxed tool set.
pub struct Agent {
    provider: Box<dyn LlmProvider>,
    conversation: Conversation,
    dispatcher: Dispatcher,
    /// Sent unchanged on every round
    tools: Vec<Tool>,
    model: String,
    max_tokens: u32,
    max_rounds: u32,
}

impl Agent {
    /// Create an agent with the default system prompt and round budget.
    pub fn new(
        provider: Box<dyn LlmProvider>,
        dispatcher: Dispatcher,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            conversation: Conversation::with_system(DEFAULT_SYSTEM_PROMPT),
            dispatcher,
            tools: catalog::definitions(),
            model: model.into(),
            max_tokens,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Replace the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.conversation = Conversation::with_system(system);
        self
    }

    /// Set the maximum number of model rounds.
    #[must_use]
    pub const fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Conversation so far.
    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run a session for `instruction` until the model answers or the
    /// round budget runs out.
    ///
    /// # Errors
    ///
    /// Returns error if the model query fails. Tool failures are never
    /// errors here; the model sees them as results.
    pub async fn run<F>(&mut self, instruction: &str, mut on_event: F) -> Result<Outcome>
    where
        F: FnMut(ChatEvent),
    {
        self.conversation.add_user_message(instruction);

        let mut rounds = 0;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel if rounds >= self.max_rounds => {
                    tracing::warn!(rounds, "round budget exhausted without a final answer");
                    LoopState::Done(Outcome::BudgetExhausted { rounds })
                }
                LoopState::AwaitingModel => {
                    rounds += 1;
                    tracing::info!(round = rounds, provider = self.provider.name(), "querying model");

                    let blocks = self.query_model(&mut on_event).await?;
                    self.accept_reply(blocks, &mut on_event)
                }
                LoopState::ExecutingTool(call) => {
                    self.execute_tool(call, &mut on_event).await;
                    LoopState::AwaitingModel
                }
                LoopState::Done(outcome) => return Ok(outcome),
            };
        }
    }

    async fn query_model<F>(&self, on_event: &mut F) -> Result<Vec<ContentBlock>>
    where
        F: FnMut(ChatEvent),
    {
        debug_assert!(
            self.conversation.pending_tool_use().is_none(),
            "model queried with an unanswered tool call"
        );

        let request = CompletionRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: self.conversation.messages().to_vec(),
            system: self.conversation.system().map(String::from),
            tools: Some(self.tools.clone()),
        };

        let stream = self.provider.stream(request).await?;
        futures::pin_mut!(stream);

        let mut reply = ReplyCollector::default();

        while let Some(event) = stream.next().await {
            match event? {
                CompletionEvent::Done {
                    usage: Some(usage), ..
                } => on_event(ChatEvent::Usage {
                    input_tokens: usage.input_tokens,
                    output_tokens: usage.output_tokens,
                }),
                CompletionEvent::Error(message) => {
                    return Err(AgentError::Api { status: 0, message });
                }
                event => reply.push(event),
            }
        }

        Ok(reply.finish())
    }

    /// Record the model's reply and decide the next state.
    ///
    /// Only the first tool call is honored; any others are discarded so
    /// every recorded call gets exactly one result.
    fn accept_reply<F>(&mut self, blocks: Vec<ContentBlock>, on_event: &mut F) -> LoopState
    where
        F: FnMut(ChatEvent),
    {
        let mut text = String::new();
        let mut calls = Vec::new();

        for block in blocks {
            match block {
                ContentBlock::Text { text: t } => text.push_str(&t),
                ContentBlock::ToolUse { id, name, input } => calls.push((id, name, input)),
                ContentBlock::ToolResult { .. } => {}
            }
        }

        let mut calls = calls.into_iter();
        let Some((id, name, input)) = calls.next() else {
            self.conversation.add_assistant_message(text.clone());
            return LoopState::Done(Outcome::Answer(text));
        };

        let ignored: Vec<String> = calls.map(|(_, name, _)| name).collect();
        if !ignored.is_empty() {
            tracing::debug!(kept = %name, ?ignored, "ignoring extra tool calls in reply");
        }

        let id = if id.is_empty() {
            format!("call_{}", uuid::Uuid::new_v4().simple())
        } else {
            id
        };

        let mut recorded = Vec::with_capacity(2);
        if !text.is_empty() {
            on_event(ChatEvent::Text(text.clone()));
            recorded.push(ContentBlock::Text { text });
        }
        recorded.push(ContentBlock::ToolUse {
            id: id.clone(),
            name: name.clone(),
            input: input.clone(),
        });
        self.conversation.add_assistant_blocks(recorded);

        LoopState::ExecutingTool(ToolCall {
            id,
            name,
            arguments: input,
        })
    }

    async fn execute_tool<F>(&mut self, call: ToolCall, on_event: &mut F)
    where
        F: FnMut(ChatEvent),
    {
        let invocation = format_tool_invocation(&call.name, &call.arguments);

        on_event(ChatEvent::ToolStart {
            name: call.name.clone(),
            arguments: call.arguments.to_string(),
        });

        tracing::info!(tool = %call.name, %invocation, "executing tool");
        let result = self.dispatcher.execute(&call).await;

        on_event(ChatEvent::ToolCall {
            name: call.name,
            invocation,
            output: result.content.clone(),
            is_error: result.is_error,
        });

        self.conversation
            .add_tool_result(call.id, result.content, result.is_error);
    }
}

/// Assembles one model reply from completion events.
#[derive(Default)]
struct ReplyCollector {
    blocks: Vec<ContentBlock>,
    partial_inputs: HashMap<usize, String>,
}

impl ReplyCollector {
    fn push(&mut self, event: CompletionEvent) {
        match event {
            CompletionEvent::TextDelta(text) => {
                if let Some(ContentBlock::Text { text: t }) = self.blocks.last_mut() {
                    t.push_str(&text);
                } else {
                    self.blocks.push(ContentBlock::Text { text });
                }
            }
            CompletionEvent::ToolUseStart { index, id, name } => {
                *self.slot(index) = ContentBlock::ToolUse {
                    id,
                    name,
                    input: serde_json::Value::Null,
                };
            }
            CompletionEvent::ToolInputDelta {
                index,
                partial_json,
            } => {
                self.partial_inputs
                    .entry(index)
                    .or_default()
                    .push_str(&partial_json);
            }
            CompletionEvent::ContentBlockDone {
                index,
                block: done @ ContentBlock::ToolUse { .. },
            } => {
                let streamed = self
                    .partial_inputs
                    .remove(&index)
                    .and_then(|json| serde_json::from_str(&json).ok());

                let slot = self.slot(index);
                match &mut *slot {
                    ContentBlock::ToolUse { input, .. } => {
                        if let Some(value) = streamed {
                            *input = value;
                        } else if input.is_null() {
                            if let ContentBlock::ToolUse { input: done_input, .. } = done {
                                *input = done_input;
                            }
                        }
                    }
                    // Backends that don't stream tool calls only send the finished block
                    _ => *slot = done,
                }
            }
            CompletionEvent::ContentBlockDone { .. }
            | CompletionEvent::Done { .. }
            | CompletionEvent::Error(_) => {}
        }
    }

    fn slot(&mut self, index: usize) -> &mut ContentBlock {
        while self.blocks.len() <= index {
            self.blocks.push(ContentBlock::Text {
                text: String::new(),
            });
        }
        &mut self.blocks[index]
    }

    fn finish(self) -> Vec<ContentBlock> {
        self.blocks
            .into_iter()
            .filter(|block| !matches!(block, ContentBlock::Text { text } if text.is_empty()))
            .collect()
    }
}

/// Format tool input for display in the terminal
fn format_tool_invocation(name: &str, input: &serde_json::Value) -> String {
    const MAX_LEN: usize = 60;

    let field = |key: &str| input.get(key).and_then(|v| v.as_str()).unwrap_or("");

    let raw = match name {
        "list_directory" => match field("directory") {
            "" => ".".to_string(),
            dir => dir.to_string(),
        },
        "read_file" | "write_file" => field("file_path").to_string(),
        "execute_script" => {
            let args: Vec<&str> = input
                .get("args")
                .and_then(|v| v.as_array())
                .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
                .unwrap_or_default();
            std::iter::once(field("file_path"))
                .chain(args)
                .collect::<Vec<_>>()
                .join(" ")
        }
        _ => input
            .as_object()
            .and_then(|obj| obj.values().find_map(|v| v.as_str()))
            .unwrap_or("")
            .to_string(),
    };

    if raw.chars().count() > MAX_LEN {
        let cut: String = raw.chars().take(MAX_LEN - 3).collect();
        format!("{cut}...")
    } else {
        raw
    }
}
