//! Provider abstraction for the chat front-end
//!
//! - Unified streaming interface
//! - One-shot completions for scripted use

mod gemini;

pub use gemini::GeminiChatProvider;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Unified provider trait for LLM backends
#[async_trait]
pub trait Provider: Send + Sync {
    /// Create a streaming chat completion
    async fn create_stream(&self, request: ChatRequest) -> Result<mpsc::Receiver<StreamEvent>>;

    /// Create a non-streaming chat completion
    async fn create(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Get the provider name for logging
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
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

/// One chat turn: prior history plus the new user input
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub input: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub text: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Events delivered on a streaming completion
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    TextDelta(String),
    Usage(Usage),
    Error(String),
    Done,
}
