//! HTTP handlers

use askama::Template;
use axum::{
    extract::State,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{ApiError, AppState};

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate;

/// GET / - the chat page
pub async fn home() -> Result<Html<String>, ApiError> {
    let page = IndexTemplate
        .render()
        .map_err(|e| ApiError::internal(format!("template error: {}", e)))?;
    Ok(Html(page))
}

#[derive(Deserialize)]
pub struct ChatBody {
    pub message: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Serialize)]
pub struct ChatReply {
    pub response: String,
}

/// POST /chat - route a message through the orchestrator
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, ApiError> {
    let message = body.message.unwrap_or_default();
    if message.trim().is_empty() {
        return Err(ApiError::bad_request("No message provided"));
    }

    let session_id = body
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    info!(session = %session_id, "chat request");

    let history = state.sessions.history(&session_id).await;
    let response = state
        .orchestrator
        .handle(&message, &history)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    state.sessions.append(&session_id, &message, &response).await;

    Ok(Json(ChatReply { response }))
}

#[derive(Deserialize)]
pub struct RunCodeBody {
    pub code: Option<String>,
}

#[derive(Serialize)]
pub struct RunCodeReply {
    pub output: String,
}

/// POST /run_code - execute code from the editor pane directly
pub async fn run_code(
    State(state): State<AppState>,
    Json(body): Json<RunCodeBody>,
) -> Result<Json<RunCodeReply>, ApiError> {
    let code = body.code.unwrap_or_default();
    if code.trim().is_empty() {
        return Err(ApiError::bad_request("No code provided"));
    }

    // Runner failures belong in the console pane, not in a 500
    let output = match state.tools.run_python(&code).await {
        Ok(output) => output,
        Err(e) => format!("Execution failed: {}", e),
    };

    Ok(Json(RunCodeReply { output }))
}

/// GET /health - liveness check
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": state.config.model,
    }))
}
