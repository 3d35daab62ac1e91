//! Client session to an MCP tool server.
//!
//! Spawns the server as a child process, performs the initialization
//! handshake, then exchanges one JSON-RPC line per request over the
//! child's stdin/stdout.

use std::process::Stdio;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info};

use crate::config::McpServerConfig;
use crate::mcp::{CallToolResult, ToolDescriptor, PROTOCOL_VERSION};

/// Channel to a tool-serving process: discovery plus synchronous dispatch.
///
/// The conversation loop depends on this trait, not on the transport, so
/// tests can substitute a scripted session.
#[async_trait]
pub trait ToolSession: Send {
    /// Enumerate the tools the server offers.
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>>;

    /// Invoke a named tool, returning its content normalized to a single
    /// string.
    async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<String>;
}

/// A session over a spawned server process speaking line-delimited
/// JSON-RPC on stdin/stdout.
pub struct StdioSession {
    // Keep the server process alive; it is killed when the session drops.
    #[allow(dead_code)]
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: i64,
}

impl StdioSession {
    /// Spawn the configured server command and perform the initialize
    /// handshake.
    ///
    /// Failure here is fatal to the run: without a session there are no
    /// tools to offer the model.
    pub async fn connect(config: &McpServerConfig) -> Result<Self> {
        info!(command = %config.command, "spawning MCP server");

        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit()) // server logs go to our stderr
            .kill_on_drop(true);
        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn MCP server (command: {})", config.command))?;

        let stdin = child.stdin.take().context("MCP server stdin not piped")?;
        let stdout = child.stdout.take().context("MCP server stdout not piped")?;

        let mut session = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            next_id: 1,
        };
        session.initialize().await?;
        Ok(session)
    }

    async fn initialize(&mut self) -> Result<()> {
        let response = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "pokebot",
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                }),
            )
            .await
            .context("MCP initialize handshake failed")?;
        debug!(response = %response, "MCP initialize response");

        self.notify("notifications/initialized", json!({})).await?;
        Ok(())
    }

    /// Send a request and read the matching response line.
    ///
    /// The server answers strictly in request order on stdout, so reading
    /// one line per request is sufficient.
    async fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        self.send_line(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }))
        .await?;

        let mut line = String::new();
        let read = self
            .stdout
            .read_line(&mut line)
            .await
            .context("failed to read from MCP server stdout")?;
        if read == 0 {
            bail!("MCP server closed the connection");
        }

        let response: Value =
            serde_json::from_str(line.trim()).context("invalid JSON from MCP server")?;
        if let Some(error) = response.get("error") {
            bail!("MCP server error: {error}");
        }
        Ok(response)
    }

    async fn notify(&mut self, method: &str, params: Value) -> Result<()> {
        self.send_line(&json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        }))
        .await
    }

    async fn send_line(&mut self, frame: &Value) -> Result<()> {
        let line = format!("{}\n", serde_json::to_string(frame)?);
        self.stdin
            .write_all(line.as_bytes())
            .await
            .context("failed to write to MCP server stdin")?;
        self.stdin.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl ToolSession for StdioSession {
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>> {
        let response = self.request("tools/list", json!({})).await?;
        let tools = response
            .get("result")
            .and_then(|result| result.get("tools"))
            .cloned()
            .context("tools/list response missing result.tools")?;
        serde_json::from_value(tools).context("malformed tool descriptor in tools/list response")
    }

    async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<String> {
        // Servers expect an object for arguments, never null.
        let arguments = if arguments.is_null() {
            json!({})
        } else {
            arguments
        };

        let response = self
            .request("tools/call", json!({ "name": name, "arguments": arguments }))
            .await?;
        let result = response
            .get("result")
            .cloned()
            .context("tools/call response missing result")?;
        let result: CallToolResult =
            serde_json::from_value(result).context("malformed tools/call result")?;
        Ok(result.content.normalize())
    }
}
