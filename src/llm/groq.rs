//! Groq (OpenAI-compatible) LLM provider implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::LlmProvider;
use crate::types::{ChatRequest, ChatResponse, Role, ToolCall};

const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

pub struct GroqProvider {
    api_key: String,
    api_base: String,
    client: reqwest::Client,
}

// --- API Request Types (OpenAI format) ---

#[derive(Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Serialize)]
struct ApiTool {
    r#type: String,
    function: ApiFunction,
}

#[derive(Serialize)]
struct ApiFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ApiToolCall {
    id: String,
    r#type: String,
    function: ApiToolCallFunction,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct ApiToolCallFunction {
    name: String,
    arguments: String,
}

// --- API Response Types ---

#[derive(Deserialize, Debug)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize, Debug)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ApiResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

// --- Implementation ---

impl GroqProvider {
    pub fn new(api_key: String, api_base: Option<String>) -> Self {
        Self {
            api_key,
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            client: reqwest::Client::new(),
        }
    }

    fn build_api_request(&self, request: &ChatRequest) -> ApiRequest {
        let mut api_messages: Vec<ApiMessage> = Vec::new();

        for msg in &request.messages {
            match msg.role {
                Role::User => {
                    api_messages.push(ApiMessage {
                        role: "user".to_string(),
                        content: Some(msg.content.clone()),
                        tool_calls: None,
                        tool_call_id: None,
                        name: None,
                    });
                }
                Role::Assistant => {
                    let tool_calls = if msg.tool_calls.is_empty() {
                        None
                    } else {
                        Some(
                            msg.tool_calls
                                .iter()
                                .map(|tc| ApiToolCall {
                                    id: tc.id.clone(),
                                    r#type: "function".to_string(),
                                    function: ApiToolCallFunction {
                                        name: tc.name.clone(),
                                        arguments: tc.arguments.clone(),
                                    },
                                })
                                .collect(),
                        )
                    };
                    api_messages.push(ApiMessage {
                        role: "assistant".to_string(),
                        content: if msg.content.is_empty() {
                            None
                        } else {
                            Some(msg.content.clone())
                        },
                        tool_calls,
                        tool_call_id: None,
                        name: None,
                    });
                }
                Role::Tool => {
                    api_messages.push(ApiMessage {
                        role: "tool".to_string(),
                        content: Some(msg.content.clone()),
                        tool_calls: None,
                        tool_call_id: msg.tool_call_id.clone(),
                        name: msg.name.clone(),
                    });
                }
            }
        }

        let tools: Vec<ApiTool> = request
            .tools
            .iter()
            .map(|t| ApiTool {
                r#type: "function".to_string(),
                function: ApiFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.input_schema.clone(),
                },
            })
            .collect();

        ApiRequest {
            model: request.model.clone(),
            messages: api_messages,
            tools,
        }
    }

    fn parse_response(&self, api_response: ApiResponse) -> Result<ChatResponse> {
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .context("Empty response from API: no choices returned")?;

        let content = choice.message.content.unwrap_or_default();
        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        Ok(ChatResponse { content, tool_calls })
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let api_request = self.build_api_request(request);
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, error_body);
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .context("Failed to parse API response")?;

        self.parse_response(api_response)
    }

    fn name(&self) -> &str {
        "Groq"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Message, ToolDefinition};
    use serde_json::json;

    fn provider() -> GroqProvider {
        GroqProvider::new("test-key".to_string(), None)
    }

    #[test]
    fn tools_serialize_in_function_calling_shape() {
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile".to_string(),
            messages: vec![Message::user("hi")],
            tools: vec![ToolDefinition {
                name: "get_pokemon_stats".to_string(),
                description: "Get base stats".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": { "pokemon_name": { "type": "string" } },
                    "required": ["pokemon_name"],
                }),
            }],
        };

        let body = serde_json::to_value(provider().build_api_request(&request)).unwrap();

        assert_eq!(body["model"], "llama-3.3-70b-versatile");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "get_pokemon_stats");
        assert_eq!(body["tools"][0]["function"]["description"], "Get base stats");
        assert_eq!(
            body["tools"][0]["function"]["parameters"]["required"][0],
            "pokemon_name"
        );
    }

    #[test]
    fn empty_tool_list_is_omitted_from_body() {
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile".to_string(),
            messages: vec![Message::user("hi")],
            tools: vec![],
        };
        let body = serde_json::to_value(provider().build_api_request(&request)).unwrap();
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn assistant_tool_calls_round_trip_to_wire_shape() {
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile".to_string(),
            messages: vec![
                Message::user("stats for charizard"),
                Message::assistant_with_tool_calls(
                    "",
                    vec![ToolCall {
                        id: "call_abc".to_string(),
                        name: "get_pokemon_stats".to_string(),
                        arguments: "{\"pokemon_name\":\"charizard\"}".to_string(),
                    }],
                ),
                Message::tool_result("call_abc", "get_pokemon_stats", "{\"pokemon_id\":6}"),
            ],
            tools: vec![],
        };

        let body = serde_json::to_value(provider().build_api_request(&request)).unwrap();
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);

        let assistant = &messages[1];
        assert_eq!(assistant["role"], "assistant");
        // Content-free assistant messages send null, not ""
        assert!(assistant["content"].is_null());
        assert_eq!(assistant["tool_calls"][0]["id"], "call_abc");
        assert_eq!(assistant["tool_calls"][0]["type"], "function");
        assert_eq!(
            assistant["tool_calls"][0]["function"]["name"],
            "get_pokemon_stats"
        );
        assert_eq!(
            assistant["tool_calls"][0]["function"]["arguments"],
            "{\"pokemon_name\":\"charizard\"}"
        );

        let tool = &messages[2];
        assert_eq!(tool["role"], "tool");
        assert_eq!(tool["tool_call_id"], "call_abc");
        assert_eq!(tool["name"], "get_pokemon_stats");
        assert_eq!(tool["content"], "{\"pokemon_id\":6}");
    }

    #[test]
    fn parse_response_maps_first_choice() {
        let api_response: ApiResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "get_pokemon_abilities",
                            "arguments": "{\"pokemon_name\":\"pikachu\"}"
                        }
                    }]
                }
            }]
        }))
        .unwrap();

        let parsed = provider().parse_response(api_response).unwrap();
        assert_eq!(parsed.content, "");
        assert!(parsed.has_tool_calls());
        assert_eq!(parsed.tool_calls[0].id, "call_1");
        assert_eq!(parsed.tool_calls[0].name, "get_pokemon_abilities");
    }

    #[test]
    fn parse_response_rejects_empty_choices() {
        let api_response: ApiResponse = serde_json::from_value(json!({ "choices": [] })).unwrap();
        let err = provider().parse_response(api_response).unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }
}
