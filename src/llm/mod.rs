//! LLM Client module.
//!
//! This module defines the `LlmProvider` trait that abstracts over
//! chat-completion API providers, and the adapter that turns tool
//! descriptors discovered from the tool server into the definitions the
//! model sees.
//!
//! Key concepts:
//! - **Trait**: Rust's way of defining shared behavior (like interfaces)
//! - **async_trait**: since Rust traits don't natively support async fn,
//!   we use the async-trait crate to enable async methods in traits
//! - **Provider pattern**: each LLM API has its own request/response format,
//!   but they all implement the same trait so the rest of the code doesn't care

pub mod groq;

use anyhow::Result;
use async_trait::async_trait;

use crate::mcp::ToolDescriptor;
use crate::types::{ChatRequest, ChatResponse, ToolDefinition};

/// Trait that all LLM providers must implement.
///
/// This is the core abstraction that allows swapping the real HTTP
/// client for a scripted mock in tests without changing the agent logic.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request and get a full response.
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Return the provider's display name (for logging).
    fn name(&self) -> &str;
}

/// Convert tool descriptors into the model-facing tool definitions.
///
/// Pure and order-preserving. Called once at startup; the resulting list
/// is immutable for the rest of the run.
pub fn tool_definitions(tools: &[ToolDescriptor]) -> Vec<ToolDefinition> {
    tools
        .iter()
        .map(|tool| ToolDefinition {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: tool.input_schema.clone(),
        })
        .collect()
}
