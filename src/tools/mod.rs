//! Tool definitions and executor
//!
//! Three side-effecting tools back the specialists:
//! - run_python: code execution with a hard timeout
//! - web_search: DuckDuckGo lookup, top results digested to text
//! - generate_image: templated image-provider URL with a random seed
//!
//! Tool failures are folded into the output string handed back to the model
//! so a bad call never kills the turn.

pub mod image;
pub mod python;
pub mod search;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;

use crate::config::Config;
use crate::provider::ToolDefinition;

pub use image::IMAGE_SENTINEL;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("python execution failed: {0}")]
    CodeExec(String),

    #[error("python run timed out after {0}s")]
    CodeTimeout(u64),

    #[error("search failed: {0}")]
    Search(String),
}

/// Owns the tool implementations and the HTTP client they share
pub struct ToolRegistry {
    config: Arc<Config>,
    client: reqwest::Client,
}

impl ToolRegistry {
    pub fn new(config: Arc<Config>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; Maestro/0.1)")
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// All tool definitions, in Gemini function-declaration form
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "run_python".into(),
                description: "Execute Python code for math, logic and data questions. Returns stdout, or the error output if the code failed.".into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "code": {
                            "type": "string",
                            "description": "Python source to execute"
                        }
                    },
                    "required": ["code"]
                }),
            },
            ToolDefinition {
                name: "web_search".into(),
                description: "Search the internet for real-time facts. Returns a short list of titles and snippets.".into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query"
                        }
                    },
                    "required": ["query"]
                }),
            },
            ToolDefinition {
                name: "generate_image".into(),
                description: "Generate an image from a detailed visual description. Returns a string starting with 'IMAGE_GENERATED:' followed by the image URL.".into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "prompt": {
                            "type": "string",
                            "description": "Detailed description of the visual"
                        }
                    },
                    "required": ["prompt"]
                }),
            },
        ]
    }

    /// Definitions restricted to a specialist's tool set
    pub fn definitions_for(&self, names: &[&str]) -> Vec<ToolDefinition> {
        self.definitions()
            .into_iter()
            .filter(|t| names.contains(&t.name.as_str()))
            .collect()
    }

    /// Execute a tool call by name. Unknown tools produce an explanatory
    /// string rather than an error.
    pub async fn execute(&self, name: &str, args: &Value) -> Result<String, ToolError> {
        match name {
            "run_python" => {
                let code = args["code"].as_str().unwrap_or("");
                self.run_python(code).await
            }
            "web_search" => {
                let query = args["query"].as_str().unwrap_or("");
                self.web_search(query).await
            }
            "generate_image" => {
                let prompt = args["prompt"].as_str().unwrap_or("");
                Ok(self.generate_image(prompt))
            }
            _ => Ok(format!("Unknown tool: {}", name)),
        }
    }

    pub async fn run_python(&self, code: &str) -> Result<String, ToolError> {
        let output = python::run(python::PythonInput {
            code: code.to_string(),
            binary: self.config.python_bin.clone(),
            timeout: Duration::from_secs(self.config.code_timeout_secs),
            output_cap: self.config.code_output_cap,
        })
        .await?;

        Ok(python::format_output(&output))
    }

    pub async fn web_search(&self, query: &str) -> Result<String, ToolError> {
        let results = search::web_search(
            &self.client,
            search::SearchInput {
                query: query.to_string(),
                base_url: self.config.search_base_url.clone(),
                limit: self.config.search_limit,
                timeout: Duration::from_secs(self.config.search_timeout_secs),
            },
        )
        .await?;

        Ok(search::format_results(&results))
    }

    pub fn generate_image(&self, prompt: &str) -> String {
        image::generate_image(image::ImageInput {
            prompt,
            width: self.config.image_width,
            height: self.config.image_height,
        })
    }
}

/// Generate a human-readable summary for a tool call
pub fn tool_summary(name: &str, args: &Value) -> String {
    fn truncate(s: &str, max_len: usize) -> String {
        if s.len() <= max_len {
            s.to_string()
        } else {
            format!("{}...", &s[..max_len.saturating_sub(3)])
        }
    }

    fn get_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
        args.get(key).and_then(|v| v.as_str())
    }

    match name {
        "run_python" => {
            let code = get_str(args, "code").unwrap_or("");
            format!("Running python: {}", truncate(code.lines().next().unwrap_or(""), 50))
        }
        "web_search" => {
            let query = get_str(args, "query").unwrap_or("");
            format!("Searching for \"{}\"", truncate(query, 40))
        }
        "generate_image" => {
            let prompt = get_str(args, "prompt").unwrap_or("");
            format!("Painting: {}", truncate(prompt, 40))
        }
        _ => name.to_string(),
    }
}
