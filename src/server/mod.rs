// HTTP front of the prompt processor
//
// One processing endpoint (mounted under both historical deployment paths),
// a health probe, permissive CORS for browser frontends and a body limit
// sized for base64 images.

mod handlers;

pub use handlers::{
    handle_generate, handle_preflight, health_check, method_not_allowed, HealthResponse,
};

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::knowledge::KnowledgeSource;
use crate::prompt::{Dispatcher, GenerationPolicy};
use crate::providers::{GeminiProvider, LlmProvider};

/// Path of the processing endpoint
pub const PROCESSOR_PATH: &str = "/api/gemini-processor";

/// Same endpoint under the serverless-functions path used by older frontends
pub const FUNCTIONS_PROCESSOR_PATH: &str = "/.netlify/functions/gemini-processor";

/// Shared, read-only state handed to every request
pub struct AppState {
    dispatcher: Dispatcher,
    knowledge: KnowledgeSource,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, knowledge: KnowledgeSource) -> Self {
        Self {
            dispatcher,
            knowledge,
        }
    }

    /// Wire the Gemini provider, policy and knowledge source from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let policy = GenerationPolicy::from_config(&config.generation)?;
        let provider: Arc<dyn LlmProvider> = Arc::new(
            GeminiProvider::from_config(config.api_key.clone(), &config.generation)
                .context("Failed to create Gemini provider")?,
        );

        let knowledge = if config.knowledge.reload_per_request {
            tracing::info!(
                "Knowledge base will be re-read on every request from {}",
                config.knowledge.directory.display()
            );
            KnowledgeSource::PerRequest(config.knowledge.directory.clone())
        } else {
            KnowledgeSource::cached(&config.knowledge.directory)
        };

        Ok(Self::new(Dispatcher::new(provider, policy), knowledge))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn knowledge(&self) -> &KnowledgeSource {
        &self.knowledge
    }
}

/// Build the application router
pub fn create_router(state: Arc<AppState>, server: &ServerConfig) -> Router {
    let processor = post(handle_generate)
        .options(handle_preflight)
        .fallback(method_not_allowed);

    let mut app = Router::new()
        .route(PROCESSOR_PATH, processor.clone())
        .route(FUNCTIONS_PROCESSOR_PATH, processor)
        .route("/health", get(health_check))
        .with_state(state)
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .layer(TraceLayer::new_for_http());

    if server.cors_enabled {
        app = app.layer(CorsLayer::permissive());
    }

    app
}

/// Bind and serve until Ctrl-C
pub async fn serve(state: Arc<AppState>, server: &ServerConfig) -> Result<()> {
    let addr: SocketAddr = server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address {}", server.bind_address))?;

    let app = create_router(state, server);

    tracing::info!("Starting prompt processor on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
