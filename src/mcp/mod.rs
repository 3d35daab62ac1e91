//! MCP (Model Context Protocol) data model shared by the client session
//! and the tool server.
//!
//! Transport is line-delimited JSON-RPC 2.0 over a child process's
//! stdin/stdout. This module holds the frame and payload types; the
//! client side lives in [`session`], the serving loop in `crate::server`.

pub mod session;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP protocol revision sent during the `initialize` handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

// --- JSON-RPC framing ---

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// One incoming JSON-RPC frame. A missing `id` marks a notification.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// One outgoing JSON-RPC frame, carrying either `result` or `error`.
#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcResponse {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

// --- Tool discovery ---

/// A tool as advertised by the server via `tools/list`.
///
/// Discovered once at session start and immutable for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

// --- Tool call results ---

/// A typed content item inside a `tools/call` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

/// The content of a tool call result: a bare string or a sequence of
/// typed items, depending on the server.
///
/// Resolved into a single flat string with [`normalize`](Self::normalize)
/// at the session boundary; the conversation loop only ever sees strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Items(Vec<ContentItem>),
}

impl ToolResultContent {
    /// Flatten to a single string: item texts joined with newlines,
    /// scalar text unchanged.
    pub fn normalize(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Items(items) => items
                .iter()
                .map(|item| item.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Result payload of a `tools/call` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: ToolResultContent,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl CallToolResult {
    /// Wrap plain text in the standard single-item shape.
    pub fn text(text: impl Into<String>, is_error: bool) -> Self {
        Self {
            content: ToolResultContent::Items(vec![ContentItem::text(text)]),
            is_error,
        }
    }
}
