//! Runtime configuration
//!
//! Everything is read from the environment (with `.env` support) once at
//! startup. `GEMINI_API_KEY` is the only required value; the rest have
//! defaults tuned for local use.

use std::str::FromStr;

use anyhow::{Context, Result};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_SEARCH_BASE_URL: &str = "https://html.duckduckgo.com/html";

#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key (GEMINI_API_KEY)
    pub api_key: String,
    /// Gemini API base URL, overridable for tests (GEMINI_BASE_URL)
    pub base_url: String,
    /// Model used for both the routing call and the delegated call
    pub model: String,

    /// Python interpreter used by the code runner
    pub python_bin: String,
    /// Wall-clock limit for a code run, in seconds
    pub code_timeout_secs: u64,
    /// Cap on captured stdout+stderr, in bytes
    pub code_output_cap: usize,

    /// Search endpoint base URL, overridable for tests (MAESTRO_SEARCH_BASE_URL)
    pub search_base_url: String,
    /// Maximum search results folded into a tool reply
    pub search_limit: usize,
    /// Timeout for a search request, in seconds
    pub search_timeout_secs: u64,

    /// Generated image dimensions
    pub image_width: u32,
    pub image_height: u32,

    /// Messages kept per session before the oldest are dropped
    pub history_cap: usize,
    /// Maximum tool-call rounds in one delegated turn
    pub max_tool_rounds: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.into(),
            model: "gemini-2.5-flash".into(),
            python_bin: "python3".into(),
            code_timeout_secs: 10,
            code_output_cap: 64 * 1024,
            search_base_url: DEFAULT_SEARCH_BASE_URL.into(),
            search_limit: 3,
            search_timeout_secs: 10,
            image_width: 1024,
            image_height: 768,
            history_cap: 20,
            max_tool_rounds: 4,
        }
    }
}

impl Config {
    /// Load configuration from the environment, reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let api_key = std::env::var("GEMINI_API_KEY")
            .context("GEMINI_API_KEY not set (put it in the environment or a .env file)")?;

        Ok(Self {
            api_key,
            base_url: env_or("GEMINI_BASE_URL", &defaults.base_url),
            model: env_or("MAESTRO_MODEL", &defaults.model),
            python_bin: env_or("MAESTRO_PYTHON_BIN", &defaults.python_bin),
            code_timeout_secs: env_parse("MAESTRO_CODE_TIMEOUT_SECS", defaults.code_timeout_secs),
            code_output_cap: env_parse("MAESTRO_CODE_OUTPUT_CAP", defaults.code_output_cap),
            search_base_url: env_or("MAESTRO_SEARCH_BASE_URL", &defaults.search_base_url),
            search_limit: env_parse("MAESTRO_SEARCH_LIMIT", defaults.search_limit),
            search_timeout_secs: env_parse("MAESTRO_SEARCH_TIMEOUT_SECS", defaults.search_timeout_secs),
            image_width: env_parse("MAESTRO_IMAGE_WIDTH", defaults.image_width),
            image_height: env_parse("MAESTRO_IMAGE_HEIGHT", defaults.image_height),
            history_cap: env_parse("MAESTRO_HISTORY_CAP", defaults.history_cap),
            max_tool_rounds: env_parse("MAESTRO_MAX_TOOL_ROUNDS", defaults.max_tool_rounds),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
