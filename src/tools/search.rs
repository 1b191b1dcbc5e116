//! Web search via the DuckDuckGo HTML endpoint
//!
//! No API key required. The result markup is scanned with plain string
//! matching; snippets go through a small HTML-to-text pass.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;

use super::ToolError;

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static RE_MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("valid regex"));

pub struct SearchInput {
    pub query: String,
    pub base_url: String,
    pub limit: usize,
    pub timeout: Duration,
}

pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: Option<String>,
}

/// Search the web, returning up to `limit` results
pub async fn web_search(client: &Client, input: SearchInput) -> Result<Vec<SearchResult>, ToolError> {
    let url = format!(
        "{}/?q={}",
        input.base_url.trim_end_matches('/'),
        urlencoding::encode(&input.query)
    );

    let response = client
        .get(&url)
        .timeout(input.timeout)
        .send()
        .await
        .map_err(|e| ToolError::Search(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ToolError::Search(format!("HTTP {}", response.status().as_u16())));
    }

    let html = response
        .text()
        .await
        .map_err(|e| ToolError::Search(e.to_string()))?;

    Ok(parse_results(&html, input.limit))
}

/// Scan DuckDuckGo result markup for links, titles and snippets
pub fn parse_results(html: &str, limit: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    for (i, chunk) in html.split("result__a").enumerate().skip(1) {
        if i > limit {
            break;
        }

        let Some(href_start) = chunk.find("href=\"") else { continue };
        let href_rest = &chunk[href_start + 6..];
        let Some(href_end) = href_rest.find('"') else { continue };
        let href = &href_rest[..href_end];

        // Decode DuckDuckGo redirect URL
        let actual_url = if href.contains("uddg=") {
            href.split("uddg=")
                .nth(1)
                .and_then(|s| s.split('&').next())
                .map(|s| urlencoding::decode(s).unwrap_or_default().to_string())
                .unwrap_or_else(|| href.to_string())
        } else {
            href.to_string()
        };

        let Some(title_end) = href_rest.find("</a>") else { continue };
        let title = strip_html(&href_rest[href_end + 2..title_end]);

        // The snippet anchor follows the title anchor inside the same chunk
        let snippet = chunk.find("result__snippet").and_then(|pos| {
            let rest = &chunk[pos..];
            let start = rest.find('>')? + 1;
            let end = rest.find("</a>")?;
            if start >= end {
                return None;
            }
            let text = strip_html(&rest[start..end]);
            (!text.is_empty()).then_some(text)
        });

        if !title.is_empty() && !actual_url.is_empty() {
            results.push(SearchResult { title, url: actual_url, snippet });
        }
    }

    results
}

/// Digest results into the bulleted list fed back to the model
pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    results
        .iter()
        .map(|r| {
            let body = r.snippet.as_deref().unwrap_or(r.url.as_str());
            format!("- {}: {}", r.title, body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop tags, decode common entities, collapse whitespace
fn strip_html(fragment: &str) -> String {
    let text = RE_TAG.replace_all(fragment, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    RE_MULTI_SPACE.replace_all(&text, " ").trim().to_string()
}
