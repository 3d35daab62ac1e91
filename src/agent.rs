//! Agent Loop - the core of the chat client.
//!
//! The Agent orchestrates one turn of the conversation between the user,
//! the model, and the tool server:
//!
//! ```text
//! User Input
//!     |
//!     v
//! +--------+     +-----+     +--------------+
//! |  LLM   |<--->|Agent|<--->| Tool Session |
//! +--------+     +-----+     +--------------+
//!     |              |
//!     v              v
//! Text Reply    Tool Results
//! ```
//!
//! A turn is at most two completion rounds: one that may request tool
//! calls, and a second that produces the final answer over the tool
//! results. Multi-round tool chaining is not supported.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::llm::LlmProvider;
use crate::mcp::session::ToolSession;
use crate::types::{ChatRequest, ChatResponse, Message, ToolDefinition};

/// The Agent holds all components and manages the conversation.
pub struct Agent {
    /// The LLM provider
    llm: Box<dyn LlmProvider>,
    /// The tool session (dispatches tool calls to the server)
    session: Box<dyn ToolSession>,
    /// Tool definitions advertised to the model, fixed at startup
    tools: Vec<ToolDefinition>,
    /// Conversation history
    messages: Vec<Message>,
    /// Model identifier sent with every completion request
    model: String,
}

impl Agent {
    /// Create a new Agent with the given components.
    pub fn new(
        llm: Box<dyn LlmProvider>,
        session: Box<dyn ToolSession>,
        tools: Vec<ToolDefinition>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            session,
            tools,
            messages: Vec::new(),
            model: model.into(),
        }
    }

    /// Process one user query through a full turn.
    ///
    /// 1. Append the user message and call the model
    /// 2. If the model wants tools -> dispatch them in request order
    /// 3. Call the model again over the extended history
    /// 4. Return the final text response
    pub async fn process_query(&mut self, query: &str) -> Result<String> {
        println!("\n[USER] {}\n", query);
        self.messages.push(Message::user(query));

        let response = self.chat_completion().await?;

        if !response.has_tool_calls() {
            if response.content.is_empty() {
                anyhow::bail!("model returned an empty response");
            }
            println!("[ASSISTANT] {}\n", response.content);
            self.messages.push(Message::assistant(&response.content));
            return Ok(response.content);
        }

        if response.content.is_empty() {
            println!("[ASSISTANT] [Tool Calls detected]");
        } else {
            println!("[ASSISTANT] {}", response.content);
        }

        // The assistant message and its tool results are staged together
        // and committed in one append once the whole batch has run.
        // History must never hold a tool-call id without its paired tool
        // message, or the next completion request would be invalid.
        let mut staged = Vec::with_capacity(response.tool_calls.len() + 1);
        staged.push(Message::assistant_with_tool_calls(
            &response.content,
            response.tool_calls.clone(),
        ));

        for tool_call in &response.tool_calls {
            println!(
                "--> Calling tool `{}` with args: {}",
                tool_call.name, tool_call.arguments
            );

            // A parse failure fails the turn; the staged batch is dropped
            // and history keeps only the user message.
            let args: Value = serde_json::from_str(&tool_call.arguments).with_context(|| {
                format!(
                    "invalid arguments for tool '{}': {}",
                    tool_call.name, tool_call.arguments
                )
            })?;

            // Tool-level failures become ordinary result content so the
            // model can explain them; the conversation goes on.
            let content = match self.session.call_tool(&tool_call.name, args).await {
                Ok(output) => output,
                Err(e) => format!("Error: {}", e),
            };

            println!("<-- Result from `{}`: {}\n", tool_call.name, content);
            staged.push(Message::tool_result(&tool_call.id, &tool_call.name, content));
        }

        self.messages.append(&mut staged);

        // Second round: the model sees the tool results and answers in
        // text. Tool calls requested here are ignored.
        let final_response = self.chat_completion().await?;
        println!("[ASSISTANT] {}\n", final_response.content);
        self.messages.push(Message::assistant(&final_response.content));
        Ok(final_response.content)
    }

    async fn chat_completion(&self) -> Result<ChatResponse> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: self.messages.clone(),
            tools: self.tools.clone(),
        };
        self.llm
            .chat_completion(&request)
            .await
            .context("LLM call failed")
    }

    /// Get a reference to the conversation history.
    pub fn history(&self) -> &[Message] {
        &self.messages
    }
}
