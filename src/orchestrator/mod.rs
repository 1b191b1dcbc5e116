//! Request orchestration
//!
//! Two model calls per turn: a routing call that labels the request with a
//! specialist, then a delegated call under that specialist's instruction and
//! tool set. Tool calls are executed locally and fed back until the model
//! settles on text.

mod specialist;

pub use specialist::Specialist;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::provider::{
    ChatRequest, FinishReason, Message, Provider, ToolContinueRequest, ToolResult,
};
use crate::tools::{tool_summary, ToolRegistry};

const ROUTING_INSTRUCTION: &str = "\
You are the manager of a team of AI specialists.

Specialists:
- PROFESSOR: math, code, logic, calculations.
- RESEARCHER: news, facts, stocks, current events.
- ARTIST: images, diagrams, drawing.
- CHAT: greetings, philosophy, simple conversation.

Reply with exactly one specialist name: PROFESSOR, RESEARCHER, ARTIST, or CHAT.";

pub struct Orchestrator {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    config: Arc<Config>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>, config: Arc<Config>) -> Self {
        Self { provider, tools, config }
    }

    /// Handle one user turn: classify, then delegate.
    pub async fn handle(&self, input: &str, history: &[Message]) -> Result<String> {
        let specialist = self.classify(input).await;
        info!(specialist = specialist.name(), "routing decision");
        self.delegate(specialist, input, history).await
    }

    /// Ask the model which specialist should take the request. A failed or
    /// unparseable routing call falls through to Chat; the turn survives.
    async fn classify(&self, input: &str) -> Specialist {
        let request = ChatRequest {
            model: self.config.model.clone(),
            system: ROUTING_INSTRUCTION.to_string(),
            messages: vec![],
            input: input.to_string(),
            tools: vec![],
        };

        match self.provider.create(request).await {
            Ok(response) => Specialist::from_decision(&response.text),
            Err(e) => {
                warn!("routing call failed, defaulting to chat: {e:#}");
                Specialist::Chat
            }
        }
    }

    /// Run the delegated call, executing tool calls until the model stops
    /// asking for them or the round cap is hit.
    async fn delegate(
        &self,
        specialist: Specialist,
        input: &str,
        history: &[Message],
    ) -> Result<String> {
        let tools = self.tools.definitions_for(specialist.tool_names());
        let mut messages = history.to_vec();

        let request = ChatRequest {
            model: self.config.model.clone(),
            system: specialist.instruction().to_string(),
            messages: messages.clone(),
            input: input.to_string(),
            tools: tools.clone(),
        };

        let mut response = self.provider.create(request).await?;
        let mut text = response.text.clone();
        let mut rounds = 0;

        while response.finish_reason == FinishReason::ToolCalls
            && !response.tool_calls.is_empty()
            && rounds < self.config.max_tool_rounds
        {
            rounds += 1;

            let mut results = Vec::with_capacity(response.tool_calls.len());
            for call in &response.tool_calls {
                info!("{}", tool_summary(&call.name, &call.arguments));
                let output = match self.tools.execute(&call.name, &call.arguments).await {
                    Ok(output) => output,
                    Err(e) => format!("Error: {}", e),
                };
                debug!(tool = %call.name, bytes = output.len(), "tool result");
                results.push(ToolResult {
                    call_id: call.call_id.clone(),
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                    output,
                });
            }

            // Keep this round visible to later ones as plain context
            if !response.text.is_empty() {
                messages.push(Message::assistant(response.text.clone()));
            }
            for result in &results {
                messages.push(Message::assistant(format!("[Called {} tool]", result.name)));
                messages.push(Message::user(format!("[{} result]: {}", result.name, result.output)));
            }

            let continue_request = ToolContinueRequest {
                model: self.config.model.clone(),
                system: specialist.instruction().to_string(),
                messages: messages.clone(),
                input: input.to_string(),
                tool_results: results,
                tools: tools.clone(),
            };

            response = self.provider.continue_with_tools(continue_request).await?;
            if !response.text.is_empty() {
                text = response.text.clone();
            }
        }

        if let Some(usage) = response.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "delegated call usage"
            );
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ChatResponse, ToolCall};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Scripted provider: pops canned responses, records requests.
    struct ScriptedProvider {
        responses: Mutex<Vec<ChatResponse>>,
        continuations: Mutex<Vec<ToolContinueRequest>>,
    }

    impl ScriptedProvider {
        fn new(mut responses: Vec<ChatResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                continuations: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn create(&self, _request: ChatRequest) -> Result<ChatResponse> {
            Ok(self.responses.lock().unwrap().pop().expect("script exhausted"))
        }

        async fn continue_with_tools(&self, request: ToolContinueRequest) -> Result<ChatResponse> {
            self.continuations.lock().unwrap().push(request);
            Ok(self.responses.lock().unwrap().pop().expect("script exhausted"))
        }
    }

    fn text_response(text: &str) -> ChatResponse {
        ChatResponse {
            id: "r".into(),
            text: text.into(),
            tool_calls: vec![],
            usage: None,
            finish_reason: FinishReason::Stop,
        }
    }

    fn tool_response(name: &str, args: serde_json::Value) -> ChatResponse {
        ChatResponse {
            id: "r".into(),
            text: String::new(),
            tool_calls: vec![ToolCall {
                call_id: "gemini_0".into(),
                name: name.into(),
                arguments: args,
            }],
            usage: None,
            finish_reason: FinishReason::ToolCalls,
        }
    }

    fn orchestrator(provider: Arc<ScriptedProvider>) -> Orchestrator {
        let config = Arc::new(Config::default());
        let tools = Arc::new(ToolRegistry::new(config.clone()));
        Orchestrator::new(provider, tools, config)
    }

    #[tokio::test]
    async fn test_chat_turn_without_tools() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            text_response("CHAT"),
            text_response("Hello! How can I help?"),
        ]));
        let orch = orchestrator(provider);

        let reply = orch.handle("hi there", &[]).await.unwrap();
        assert_eq!(reply, "Hello! How can I help?");
    }

    #[tokio::test]
    async fn test_artist_turn_runs_tool_and_continues() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            text_response("ARTIST"),
            tool_response("generate_image", json!({ "prompt": "a red fox" })),
            text_response("Here you go! IMAGE_GENERATED: https://image.pollinations.ai/prompt/x"),
        ]));
        let orch = orchestrator(provider.clone());

        let reply = orch.handle("draw me a fox", &[]).await.unwrap();
        assert!(reply.contains("IMAGE_GENERATED:"));

        // The continuation carried the executed tool result
        let continuations = provider.continuations.lock().unwrap();
        assert_eq!(continuations.len(), 1);
        let result = &continuations[0].tool_results[0];
        assert_eq!(result.name, "generate_image");
        assert!(result.output.starts_with("IMAGE_GENERATED:"));
        assert!(result.output.contains("a%20red%20fox"));
    }

    #[tokio::test]
    async fn test_tool_round_cap() {
        // Model keeps asking for tools; the loop stops at max_tool_rounds
        // and falls back to the last text seen.
        let mut responses = vec![text_response("ARTIST")];
        for _ in 0..5 {
            responses.push(tool_response("generate_image", json!({ "prompt": "again" })));
        }
        let provider = Arc::new(ScriptedProvider::new(responses));
        let orch = orchestrator(provider.clone());

        let reply = orch.handle("draw forever", &[]).await.unwrap();
        assert_eq!(reply, "");
        assert_eq!(provider.continuations.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_not_fatal() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            text_response("CHAT"),
            tool_response("frobnicate", json!({})),
            text_response("Sorry, I can't do that."),
        ]));
        let orch = orchestrator(provider.clone());

        let reply = orch.handle("frobnicate please", &[]).await.unwrap();
        assert_eq!(reply, "Sorry, I can't do that.");

        let continuations = provider.continuations.lock().unwrap();
        assert!(continuations[0].tool_results[0].output.contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_history_is_forwarded() {
        struct CapturingProvider {
            seen: Mutex<Vec<ChatRequest>>,
        }

        #[async_trait]
        impl Provider for CapturingProvider {
            fn name(&self) -> &'static str {
                "capturing"
            }

            async fn create(&self, request: ChatRequest) -> Result<ChatResponse> {
                self.seen.lock().unwrap().push(request);
                Ok(text_response("CHAT"))
            }

            async fn continue_with_tools(&self, _r: ToolContinueRequest) -> Result<ChatResponse> {
                unreachable!()
            }
        }

        let provider = Arc::new(CapturingProvider { seen: Mutex::new(vec![]) });
        let config = Arc::new(Config::default());
        let tools = Arc::new(ToolRegistry::new(config.clone()));
        let orch = Orchestrator::new(provider.clone(), tools, config);

        let history = vec![Message::user("earlier"), Message::assistant("noted")];
        orch.handle("and now?", &history).await.unwrap();

        let seen = provider.seen.lock().unwrap();
        // Routing call goes out without history; the delegated call carries it
        assert!(seen[0].messages.is_empty());
        assert_eq!(seen[1].messages.len(), 2);
        assert_eq!(seen[1].messages[0].content, "earlier");
    }
}
