//! Provider abstraction for the chat backend
//!
//! One hosted model does all the thinking; this module is the seam between
//! the orchestrator and its HTTP API. Non-streaming only: the web client is
//! plain request/response JSON.

mod gemini;

pub use gemini::GeminiProvider;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Unified provider trait for LLM backends
#[async_trait]
pub trait Provider: Send + Sync {
    /// Create a chat completion
    async fn create(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Continue a conversation with tool results
    async fn continue_with_tools(&self, request: ToolContinueRequest) -> Result<ChatResponse>;

    /// Get the provider name for logging
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

/// A prior conversation turn
#[derive(Debug, Clone)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into() }
    }
}

/// Tool definition passed to the model as a function declaration
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A chat completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<Message>,
    pub input: String,
    pub tools: Vec<ToolDefinition>,
}

/// Continuation request carrying executed tool results
#[derive(Debug, Clone)]
pub struct ToolContinueRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<Message>,
    pub input: String,
    pub tool_results: Vec<ToolResult>,
    pub tools: Vec<ToolDefinition>,
}

/// A function call requested by the model
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub call_id: String,
    pub name: String,
    pub arguments: Value,
}

/// An executed tool call, ready to feed back to the model
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub call_id: String,
    pub name: String,
    pub arguments: Value,
    pub output: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    ToolCalls,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A chat completion response
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub id: String,
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<Usage>,
    pub finish_reason: FinishReason,
}
