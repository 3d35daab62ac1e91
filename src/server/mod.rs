//! MCP server side: the tool framework and the stdio serving loop.
//!
//! Key concepts:
//! - **Tool trait**: every served tool provides its name, description,
//!   JSON Schema for arguments, and an async call method
//! - **ToolRegistry**: holds all registered tools and dispatches
//!   `tools/call` requests by name (trait objects / dynamic dispatch)
//! - **stdout is the transport**: one JSON-RPC response per line, nothing
//!   else; all logging goes to stderr

pub mod tools;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use crate::mcp::{
    CallToolResult, RpcRequest, RpcResponse, ToolDescriptor, INTERNAL_ERROR, INVALID_PARAMS,
    METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
};
use crate::pokeapi::ApiError;

/// Trait that all served tools must implement.
///
/// Each tool takes JSON arguments and produces a JSON value; the serving
/// loop turns that value (or the error) into tool-result content.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g. "get_pokemon_stats").
    fn name(&self) -> &str;

    /// A human-readable description of what this tool does.
    /// The model reads this to decide when to use the tool.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn input_schema(&self) -> Value;

    /// Execute the tool with the given JSON arguments.
    async fn call(&self, args: Value) -> Result<Value, ApiError>;

    /// The wire descriptor advertised via `tools/list`.
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Routes `tools/call` requests to the correct tool implementation.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool with the registry.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    /// Get all tool descriptors (for `tools/list`).
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Serve the registry over stdin/stdout until stdin closes.
pub async fn serve_stdio(registry: ToolRegistry) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read from stdin")?
    {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!(raw = %line, "<- recv");

        if let Some(response) = handle_line(&registry, line).await {
            debug!(raw = %response, "-> send");
            stdout
                .write_all(response.as_bytes())
                .await
                .context("failed to write to stdout")?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}

/// Process one raw line: parse, dispatch, serialize.
///
/// Returns `None` for notifications, which get no response.
async fn handle_line(registry: &ToolRegistry, line: &str) -> Option<String> {
    let request: RpcRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            let response =
                RpcResponse::error(Value::Null, PARSE_ERROR, format!("Parse error: {}", e));
            return serde_json::to_string(&response).ok();
        }
    };

    let response = handle_request(registry, request).await?;
    serde_json::to_string(&response).ok()
}

async fn handle_request(registry: &ToolRegistry, request: RpcRequest) -> Option<RpcResponse> {
    // A frame without an id is a notification; process nothing, answer nothing.
    let id = request.id?;

    let response = match request.method.as_str() {
        "initialize" => RpcResponse::result(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": "pokemon-mcp-server",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        ),
        "tools/list" => RpcResponse::result(id, json!({ "tools": registry.descriptors() })),
        "tools/call" => {
            let params: CallParams = match serde_json::from_value(request.params) {
                Ok(params) => params,
                Err(e) => {
                    return Some(RpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        format!("Invalid params: {}", e),
                    ));
                }
            };
            match registry.find(&params.name) {
                Some(tool) => {
                    let arguments = if params.arguments.is_null() {
                        json!({})
                    } else {
                        params.arguments
                    };
                    let result = match tool.call(arguments).await {
                        Ok(value) => {
                            let text = match serde_json::to_string_pretty(&value) {
                                Ok(text) => text,
                                Err(_) => value.to_string(),
                            };
                            CallToolResult::text(text, false)
                        }
                        Err(e) => CallToolResult::text(e.to_string(), true),
                    };
                    match serde_json::to_value(&result) {
                        Ok(payload) => RpcResponse::result(id, payload),
                        Err(e) => RpcResponse::error(
                            id,
                            INTERNAL_ERROR,
                            format!("Failed to encode result: {}", e),
                        ),
                    }
                }
                None => RpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Unknown tool: {}", params.name),
                ),
            }
        }
        other => RpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", other)),
    };
    Some(response)
}
