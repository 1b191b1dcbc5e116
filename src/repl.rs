//! Interactive CLI mode
//!
//! Reads turns from stdin and routes them through the orchestrator with
//! accumulated in-memory history. Handy for exercising the routing without
//! a browser.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::orchestrator::Orchestrator;
use crate::provider::{GeminiProvider, Message};
use crate::tools::ToolRegistry;

pub async fn run(config: Config) -> Result<()> {
    let config = Arc::new(config);
    let tools = Arc::new(ToolRegistry::new(config.clone()));
    let provider = Arc::new(GeminiProvider::new(
        config.api_key.clone(),
        config.base_url.clone(),
    ));
    let orchestrator = Orchestrator::new(provider, tools, config.clone());

    println!("maestro interactive mode - type 'exit' to quit.");

    let mut history: Vec<Message> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\nyou> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else { break };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if matches!(input, "exit" | "quit") {
            break;
        }

        match orchestrator.handle(input, &history).await {
            Ok(reply) => {
                println!("\nmaestro> {}", reply);
                history.push(Message::user(input));
                history.push(Message::assistant(reply));

                let excess = history.len().saturating_sub(config.history_cap);
                if excess > 0 {
                    history.drain(..excess);
                }
            }
            Err(e) => eprintln!("\nerror: {e:#}"),
        }
    }

    Ok(())
}
