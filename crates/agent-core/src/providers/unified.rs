//! Unified LLM provider using the `llm` crate.
//!
//! Wraps multiple backends (Google Gemini, Anthropic, `OpenAI`, Groq,
//! Mistral, Ollama) behind [`LlmProvider`]. Each request is a single
//! tool-aware chat call whose response is replayed as a short event stream,
//! since not every backend supports streamed tool calls.

use std::collections::HashMap;

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, FunctionTool, Tool as LlmTool};
use llm::{FunctionCall, LLMProvider, ToolCall as LlmToolCall};

use crate::error::{AgentError, Result};
use crate::provider::{CompletionEvent, CompletionRequest, CompletionStream, LlmProvider};
use crate::types::{Content, ContentBlock, Message, Role, StopReason, Tool, Usage};

/// Supported model backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Google,
    Anthropic,
    OpenAi,
    Groq,
    Mistral,
    Ollama,
}

impl Backend {
    /// Stable provider name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Groq => "groq",
            Self::Mistral => "mistral",
            Self::Ollama => "ollama",
        }
    }

    /// Whether the backend refuses to start without an API key.
    ///
    /// `OpenAI`-compatible endpoints and Ollama are often local and keyless.
    #[must_use]
    pub const fn requires_api_key(self) -> bool {
        !matches!(self, Self::OpenAi | Self::Ollama)
    }

    const fn llm_backend(self) -> LLMBackend {
        match self {
            Self::Google => LLMBackend::Google,
            Self::Anthropic => LLMBackend::Anthropic,
            Self::OpenAi => LLMBackend::OpenAI,
            Self::Groq => LLMBackend::Groq,
            Self::Mistral => LLMBackend::Mistral,
            Self::Ollama => LLMBackend::Ollama,
        }
    }
}

/// Connection settings for a provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    /// Model identifier sent to the backend.
    pub model: String,
    /// Maximum tokens per response.
    pub max_tokens: u32,
    /// Request timeout in seconds; bounds every model query.
    pub timeout_secs: u64,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

/// Unified LLM provider supporting multiple backends.
pub struct UnifiedProvider {
    inner: Box<dyn LLMProvider>,
    name: &'static str,
}

impl std::fmt::Debug for UnifiedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnifiedProvider")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl UnifiedProvider {
    /// Create a provider for the given backend.
    ///
    /// # Errors
    ///
    /// Returns error if a required API key is missing or the backend
    /// rejects the configuration.
    pub fn new(backend: Backend, settings: ProviderSettings) -> Result<Self> {
        let api_key = settings.api_key.filter(|key| !key.is_empty());
        if backend.requires_api_key() && api_key.is_none() {
            return Err(AgentError::ApiKeyMissing);
        }

        let mut builder = LLMBuilder::new()
            .backend(backend.llm_backend())
            .model(settings.model)
            .max_tokens(settings.max_tokens)
            .timeout_seconds(settings.timeout_secs);

        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }

        if let Some(url) = settings.base_url {
            builder = builder.base_url(url);
        }

        let provider = builder
            .build()
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        Ok(Self {
            inner: provider,
            name: backend.name(),
        })
    }
}

/// Convert our messages to the llm crate format.
fn convert_messages(messages: &[Message], system: Option<&str>) -> Vec<ChatMessage> {
    let mut result = Vec::new();

    // Not every backend accepts a system role, so it rides in a user turn
    if let Some(sys) = system {
        result.push(
            ChatMessage::user()
                .content(format!("[System]\n{sys}"))
                .build(),
        );
    }

    // Tool results must echo the name of the function they answer
    let mut tool_names: HashMap<&str, &str> = HashMap::new();

    for msg in messages {
        match &msg.content {
            Content::Text(text) => {
                let chat_msg = match msg.role {
                    Role::User | Role::Tool => ChatMessage::user().content(text.clone()).build(),
                    Role::Assistant => ChatMessage::assistant().content(text.clone()).build(),
                };
                result.push(chat_msg);
            }
            Content::Blocks(blocks) => {
                let mut text_parts = Vec::new();
                let mut tool_uses = Vec::new();
                let mut tool_results = Vec::new();

                for block in blocks {
                    match block {
                        ContentBlock::Text { text } => {
                            text_parts.push(text.clone());
                        }
                        ContentBlock::ToolUse { id, name, input } => {
                            tool_names.insert(id.as_str(), name.as_str());
                            tool_uses.push(LlmToolCall {
                                id: id.clone(),
                                call_type: "function".to_string(),
                                function: FunctionCall {
                                    name: name.clone(),
                                    arguments: serde_json::to_string(input).unwrap_or_default(),
                                },
                            });
                        }
                        ContentBlock::ToolResult {
                            tool_use_id,
                            content,
                            is_error,
                        } => {
                            let payload = if is_error.unwrap_or(false) {
                                serde_json::json!({ "error": content })
                            } else {
                                serde_json::json!({ "result": content })
                            };
                            tool_results.push(LlmToolCall {
                                id: tool_use_id.clone(),
                                call_type: "function".to_string(),
                                function: FunctionCall {
                                    name: tool_names
                                        .get(tool_use_id.as_str())
                                        .map_or_else(|| "result".to_string(), |n| (*n).to_string()),
                                    arguments: payload.to_string(),
                                },
                            });
                        }
                    }
                }

                if !tool_uses.is_empty() {
                    result.push(
                        ChatMessage::assistant()
                            .content(text_parts.join(""))
                            .tool_use(tool_uses)
                            .build(),
                    );
                } else if !text_parts.is_empty() {
                    let text = text_parts.join("");
                    let chat_msg = match msg.role {
                        Role::User | Role::Tool => ChatMessage::user().content(text).build(),
                        Role::Assistant => ChatMessage::assistant().content(text).build(),
                    };
                    result.push(chat_msg);
                }

                if !tool_results.is_empty() {
                    result.push(ChatMessage::user().tool_result(tool_results).build());
                }
            }
        }
    }

    result
}

/// Convert our tools to llm crate format.
fn convert_tools(tools: &[Tool]) -> Vec<LlmTool> {
    tools
        .iter()
        .map(|t| LlmTool {
            tool_type: "function".to_string(),
            function: FunctionTool {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.input_schema.clone(),
            },
        })
        .collect()
}

/// Turn one tool call from the backend into a content block.
fn tool_use_block(call: LlmToolCall) -> ContentBlock {
    let input = if call.function.arguments.trim().is_empty() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_str(&call.function.arguments).unwrap_or(serde_json::Value::Null)
    };

    ContentBlock::ToolUse {
        id: call.id,
        name: call.function.name,
        input,
    }
}

#[async_trait]
impl LlmProvider for UnifiedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn stream(&self, request: CompletionRequest) -> Result<CompletionStream> {
        let messages = convert_messages(&request.messages, request.system.as_deref());
        let tools = request.tools.as_ref().map(|t| convert_tools(t));

        tracing::debug!(
            provider = self.name,
            messages = messages.len(),
            "sending chat request"
        );

        let response = self
            .inner
            .chat_with_tools(&messages, tools.as_deref())
            .await
            .map_err(|e| AgentError::Provider(e.to_string()))?;

        let text = response.text().unwrap_or_default();
        let tool_calls = response.tool_calls().unwrap_or_default();
        let usage = response.usage().map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        let stream = async_stream::stream! {
            let text_block_index = 0_usize;

            if !text.is_empty() {
                yield Ok(CompletionEvent::TextDelta(text.clone()));
            }

            let stop_reason = if tool_calls.is_empty() {
                StopReason::EndTurn
            } else {
                StopReason::ToolUse
            };

            for (index, call) in tool_calls.into_iter().enumerate() {
                yield Ok(CompletionEvent::ContentBlockDone {
                    index: text_block_index + 1 + index,
                    block: tool_use_block(call),
                });
            }

            yield Ok(CompletionEvent::Done {
                stop_reason: Some(stop_reason),
                usage,
            });
        };

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            model: "gemini-2.0-flash-001".to_string(),
            max_tokens: 1024,
            timeout_secs: 30,
            api_key: api_key.map(String::from),
            base_url: None,
        }
    }

    #[test]
    fn google_requires_api_key() {
        let result = UnifiedProvider::new(Backend::Google, settings(None));
        assert!(matches!(result, Err(AgentError::ApiKeyMissing)));
    }

    #[test]
    fn empty_api_key_counts_as_missing() {
        let result = UnifiedProvider::new(Backend::Anthropic, settings(Some("")));
        assert!(matches!(result, Err(AgentError::ApiKeyMissing)));
    }

    #[test]
    fn local_backends_do_not_require_keys() {
        assert!(!Backend::Ollama.requires_api_key());
        assert!(!Backend::OpenAi.requires_api_key());
        assert!(Backend::Groq.requires_api_key());
        assert!(Backend::Mistral.requires_api_key());
    }

    #[test]
    fn tool_results_carry_the_called_function_name() {
        let messages = vec![
            Message {
                role: Role::Assistant,
                content: Content::Blocks(vec![ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "read_file".to_string(),
                    input: serde_json::json!({"file_path": "main.py"}),
                }]),
            },
            Message {
                role: Role::Tool,
                content: Content::Blocks(vec![ContentBlock::ToolResult {
                    tool_use_id: "call_1".to_string(),
                    content: "print('hi')".to_string(),
                    is_error: None,
                }]),
            },
        ];

        let converted = convert_messages(&messages, Some("system text"));

        // system + assistant tool use + tool result
        assert_eq!(converted.len(), 3);
    }

    #[test]
    fn tool_use_block_parses_arguments() {
        let call = LlmToolCall {
            id: "call_9".to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: "list_directory".to_string(),
                arguments: r#"{"directory":"pkg"}"#.to_string(),
            },
        };

        let block = tool_use_block(call);
        assert_eq!(
            block,
            ContentBlock::ToolUse {
                id: "call_9".to_string(),
                name: "list_directory".to_string(),
                input: serde_json::json!({"directory": "pkg"}),
            }
        );
    }

    #[test]
    fn tool_use_block_treats_blank_arguments_as_empty_object() {
        let call = LlmToolCall {
            id: String::new(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: "list_directory".to_string(),
                arguments: "  ".to_string(),
            },
        };

        match tool_use_block(call) {
            ContentBlock::ToolUse { input, .. } => assert_eq!(input, serde_json::json!({})),
            other => panic!("expected tool use, got {other:?}"),
        }
    }
}
