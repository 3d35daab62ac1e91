//! Core data types used throughout pokebot.
//!
//! This module defines the message types, tool call structures,
//! and request/response formats that flow between all components.

use serde::{Deserialize, Serialize};

// --- Message Roles ---

/// The role of a message in the conversation.
///
/// Chat APIs use roles to distinguish who said what:
/// - `User`: the human's input
/// - `Assistant`: the model's response
/// - `Tool`: the result of a tool execution
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

// --- Tool Call ---

/// Represents a tool call request from the model.
///
/// When the model decides it needs to use a tool, it returns a ToolCall
/// containing the tool's name and the arguments (as a JSON string).
/// The `id` is used to match the tool result back to the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call (used to match results)
    pub id: String,
    /// Name of the tool to invoke (e.g. "get_pokemon_stats")
    pub name: String,
    /// JSON-encoded arguments for the tool
    pub arguments: String,
}

// --- Tool Definition ---

/// Describes a tool's interface to the model via JSON Schema.
///
/// This is sent with every completion request so the model knows what
/// tools are available, what each does, and what arguments it accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool's name (must match what the tool server reports)
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON Schema describing the tool's input parameters
    pub input_schema: serde_json::Value,
}

// --- Messages ---

/// A single message in the conversation history.
///
/// Messages flow between user, assistant, and tool results.
/// The conversation is modeled as a `Vec<Message>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// If the assistant wants to call tools, this will be non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For tool result messages, this links back to the tool call ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For tool result messages, the name of the tool that produced it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: vec![],
            tool_call_id: None,
            name: None,
        }
    }

    /// Create an assistant message (text reply from the model).
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: vec![],
            tool_call_id: None,
            name: None,
        }
    }

    /// Create an assistant message that includes tool calls.
    pub fn assistant_with_tool_calls(
        content: impl Into<String>,
        tool_calls: Vec<ToolCall>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a tool result message paired to the call that requested it.
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: vec![],
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
        }
    }
}

// --- Chat Request / Response ---

/// A request to send to the model.
///
/// This is our internal representation; the LLM client will convert
/// this into the provider-specific API format.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The model to use (e.g. "llama-3.3-70b-versatile")
    pub model: String,
    /// The conversation messages
    pub messages: Vec<Message>,
    /// Available tools for the model to call
    pub tools: Vec<ToolDefinition>,
}

/// The response from a completion call.
///
/// Contains either a text reply, tool calls, or both.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The text content of the response (may be empty if only tool calls)
    pub content: String,
    /// Tool calls the model wants to make (empty if just a text reply)
    pub tool_calls: Vec<ToolCall>,
}

impl ChatResponse {
    /// Returns true if the model wants to call tools.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_result_pairs_id_and_name() {
        let msg = Message::tool_result("call_1", "get_pokemon_stats", "{}");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.name.as_deref(), Some("get_pokemon_stats"));
        assert!(msg.tool_calls.is_empty());
    }

    #[test]
    fn assistant_with_tool_calls_keeps_order() {
        let calls = vec![
            ToolCall {
                id: "a".into(),
                name: "get_pokemon_abilities".into(),
                arguments: "{\"pokemon_name\":\"pikachu\"}".into(),
            },
            ToolCall {
                id: "b".into(),
                name: "get_pokemon_stats".into(),
                arguments: "{\"pokemon_name\":\"pikachu\"}".into(),
            },
        ];
        let msg = Message::assistant_with_tool_calls("", calls);
        assert_eq!(msg.tool_calls.len(), 2);
        assert_eq!(msg.tool_calls[0].id, "a");
        assert_eq!(msg.tool_calls[1].id, "b");
    }

    #[test]
    fn has_tool_calls_reflects_list() {
        let plain = ChatResponse {
            content: "hello".into(),
            tool_calls: vec![],
        };
        assert!(!plain.has_tool_calls());

        let with_calls = ChatResponse {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: "x".into(),
                name: "get_pokemon_stats".into(),
                arguments: "{}".into(),
            }],
        };
        assert!(with_calls.has_tool_calls());
    }
}
