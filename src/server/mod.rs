//! HTTP server
//!
//! Routes:
//! - GET  /         - chat page
//! - POST /chat     - route a message, reply with JSON text
//! - POST /run_code - run editor code, reply with console output
//! - GET  /health   - liveness check
//! - /static/*      - client assets

mod error;
mod handlers;

pub use error::ApiError;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{cors::{Any, CorsLayer}, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::orchestrator::Orchestrator;
use crate::provider::GeminiProvider;
use crate::session::SessionStore;
use crate::tools::ToolRegistry;

/// Max request body for the JSON endpoints (64KB)
const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub sessions: Arc<SessionStore>,
    pub tools: Arc<ToolRegistry>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire up the full state from configuration
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let tools = Arc::new(ToolRegistry::new(config.clone()));
        let provider = Arc::new(GeminiProvider::new(
            config.api_key.clone(),
            config.base_url.clone(),
        ));
        let orchestrator = Arc::new(Orchestrator::new(provider, tools.clone(), config.clone()));
        let sessions = Arc::new(SessionStore::new(config.history_cap));

        Self { orchestrator, sessions, tools, config }
    }
}

/// Create the router with all endpoints
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(handlers::home))
        .route(
            "/chat",
            post(handlers::chat).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .route(
            "/run_code",
            post(handlers::run_code).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .route("/health", get(handlers::health))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(host: &str, port: u16, static_dir: &str, config: Config) -> Result<()> {
    let model = config.model.clone();
    let state = AppState::new(config);
    let app = create_router(state, static_dir);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("listening on http://{}", addr);
    info!("model: {}", model);

    axum::serve(listener, app).await?;

    Ok(())
}
