//! Gemini provider
//!
//! Uses Gemini's generateContent API with function calling. The base URL is
//! injectable so integration tests can stand up a local mock server.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    ChatRequest, ChatResponse, FinishReason, Message, MessageRole, Provider, ToolCall,
    ToolContinueRequest, ToolDefinition, Usage,
};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gemini client for the chat interface
pub struct GeminiProvider {
    client: HttpClient,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: HttpClient::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        )
    }

    /// Build Gemini contents from history plus the current user input
    fn build_contents(messages: &[Message], input: &str) -> Vec<GeminiContent> {
        let mut contents = Vec::new();

        for msg in messages {
            let role = match msg.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            };
            contents.push(GeminiContent {
                role: role.to_string(),
                parts: vec![GeminiPart::Text { text: msg.content.clone() }],
            });
        }

        contents.push(GeminiContent {
            role: "user".to_string(),
            parts: vec![GeminiPart::Text { text: input.to_string() }],
        });

        contents
    }

    /// Build contents for a tool continuation: the model's function calls
    /// followed by our function responses, per the Gemini protocol.
    fn build_tool_contents(request: &ToolContinueRequest) -> Vec<GeminiContent> {
        let mut contents = Self::build_contents(&request.messages, &request.input);

        let call_parts: Vec<GeminiPart> = request
            .tool_results
            .iter()
            .map(|r| GeminiPart::FunctionCall {
                function_call: GeminiFunctionCall {
                    name: r.name.clone(),
                    args: r.arguments.clone(),
                },
            })
            .collect();
        contents.push(GeminiContent { role: "model".to_string(), parts: call_parts });

        let response_parts: Vec<GeminiPart> = request
            .tool_results
            .iter()
            .map(|r| GeminiPart::FunctionResponse {
                function_response: GeminiFunctionResponse {
                    name: r.name.clone(),
                    response: serde_json::json!({ "result": r.output }),
                },
            })
            .collect();
        contents.push(GeminiContent { role: "user".to_string(), parts: response_parts });

        contents
    }

    /// Convert tool definitions to Gemini function declarations
    fn build_tools(tools: &[ToolDefinition]) -> Option<Vec<GeminiTool>> {
        if tools.is_empty() {
            return None;
        }

        let declarations: Vec<GeminiFunctionDeclaration> = tools
            .iter()
            .map(|t| GeminiFunctionDeclaration {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            })
            .collect();

        Some(vec![GeminiTool { function_declarations: declarations }])
    }

    async fn make_request(
        &self,
        model: &str,
        contents: Vec<GeminiContent>,
        system: String,
        tools: Option<Vec<GeminiTool>>,
    ) -> Result<GeminiResponse> {
        let api_request = GeminiRequest {
            contents,
            system_instruction: Some(GeminiSystemInstruction {
                parts: vec![GeminiTextPart { text: system }],
            }),
            tools,
        };

        let response = self
            .client
            .post(self.endpoint(model))
            .json(&api_request)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error: {} - {}", status, body);
        }

        let api_response: GeminiResponse = response.json().await?;

        if let Some(error) = &api_response.error {
            anyhow::bail!("Gemini error: {}", error.message);
        }

        Ok(api_response)
    }

    fn parse_response(response: GeminiResponse) -> ChatResponse {
        let mut text = String::new();
        let mut tool_calls = Vec::new();
        let mut finish_reason = FinishReason::Stop;

        if let Some(candidates) = response.candidates {
            if let Some(candidate) = candidates.into_iter().next() {
                for part in candidate.content.parts {
                    if let Some(t) = part.text {
                        text.push_str(&t);
                    }
                    if let Some(fc) = part.function_call {
                        finish_reason = FinishReason::ToolCalls;
                        tool_calls.push(ToolCall {
                            call_id: format!("gemini_{}", tool_calls.len()),
                            name: fc.name,
                            arguments: fc.args,
                        });
                    }
                }
            }
        }

        let usage = response.usage_metadata.map(|u| Usage {
            input_tokens: u.prompt_token_count.unwrap_or(0),
            output_tokens: u.candidates_token_count.unwrap_or(0),
        });

        ChatResponse {
            id: uuid::Uuid::new_v4().to_string(),
            text,
            tool_calls,
            usage,
            finish_reason,
        }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    async fn create(&self, request: ChatRequest) -> Result<ChatResponse> {
        let contents = Self::build_contents(&request.messages, &request.input);
        let tools = Self::build_tools(&request.tools);

        let response = self
            .make_request(&request.model, contents, request.system, tools)
            .await?;

        Ok(Self::parse_response(response))
    }

    async fn continue_with_tools(&self, request: ToolContinueRequest) -> Result<ChatResponse> {
        let contents = Self::build_tool_contents(&request);
        let tools = Self::build_tools(&request.tools);

        let response = self
            .make_request(&request.model, contents, request.system, tools)
            .await?;

        Ok(Self::parse_response(response))
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
}

#[derive(Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiTextPart>,
}

#[derive(Serialize, Clone)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Clone)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: GeminiFunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: GeminiFunctionResponse,
    },
}

#[derive(Serialize, Deserialize, Clone)]
struct GeminiFunctionCall {
    name: String,
    args: Value,
}

#[derive(Serialize, Clone)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Serialize)]
struct GeminiTool {
    #[serde(rename = "functionDeclarations")]
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
    #[serde(rename = "functionCall")]
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Deserialize)]
struct GeminiUsage {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<u32>,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ToolResult;

    #[test]
    fn test_build_contents() {
        let messages = vec![Message::user("Hello"), Message::assistant("Hi there!")];
        let contents = GeminiProvider::build_contents(&messages, "How are you?");

        assert_eq!(contents.len(), 3); // 2 history + 1 current
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "model");
        assert_eq!(contents[2].role, "user");
    }

    #[test]
    fn test_build_tool_contents_protocol_order() {
        let request = ToolContinueRequest {
            model: "gemini-2.5-flash".into(),
            system: "You are helpful".into(),
            messages: vec![],
            input: "draw a fox".into(),
            tool_results: vec![ToolResult {
                call_id: "gemini_0".into(),
                name: "generate_image".into(),
                arguments: serde_json::json!({ "prompt": "a fox" }),
                output: "IMAGE_GENERATED: https://example.com/fox".into(),
            }],
            tools: vec![],
        };

        let contents = GeminiProvider::build_tool_contents(&request);
        // user input, model functionCall, user functionResponse
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "model");
        assert_eq!(contents[2].role, "user");
        assert!(matches!(contents[1].parts[0], GeminiPart::FunctionCall { .. }));
        assert!(matches!(contents[2].parts[0], GeminiPart::FunctionResponse { .. }));
    }

    #[test]
    fn test_parse_response_with_function_call() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Let me run that." },
                        { "functionCall": { "name": "run_python", "args": { "code": "print(42)" } } }
                    ]
                }
            }],
            "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 5 }
        });

        let response: GeminiResponse = serde_json::from_value(raw).unwrap();
        let parsed = GeminiProvider::parse_response(response);

        assert_eq!(parsed.text, "Let me run that.");
        assert_eq!(parsed.tool_calls.len(), 1);
        assert_eq!(parsed.tool_calls[0].name, "run_python");
        assert_eq!(parsed.finish_reason, FinishReason::ToolCalls);
        assert_eq!(parsed.usage.unwrap().input_tokens, 10);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = GeminiProvider::new("key".into(), "http://localhost:9999/".into());
        assert_eq!(
            provider.endpoint("gemini-2.5-flash"),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent?key=key"
        );
    }
}
