//! HTTP server exposing the generate pipeline
//!
//! Routes:
//!
//! - `POST /generate/`: run one exchange
//! - `POST /clear_history/`: empty a session transcript
//! - `POST /get_history/`: read a session transcript
//! - `GET /health`: liveness and configured model

pub mod handlers;
pub mod types;

use crate::config::Config;
use crate::error::{CodeproxyError, Result};
use crate::orchestrator::Orchestrator;
use crate::providers::create_provider;
use crate::session::MemorySessionStore;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Build the provider, session store and orchestrator described by `config`
    ///
    /// # Errors
    ///
    /// Returns error if the provider cannot be constructed
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = create_provider(&config.provider)?;
        let sessions = Arc::new(MemorySessionStore::new(config.session.max_entries));
        let orchestrator = Orchestrator::from_config(config, Arc::from(provider), sessions);
        Ok(Self::new(orchestrator))
    }
}

/// Build the application router
///
/// Trailing-slash and bare paths are both routed so either client style works.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/generate/", post(handlers::generate))
        .route("/generate", post(handlers::generate))
        .route("/clear_history/", post(handlers::clear_history))
        .route("/clear_history", post(handlers::clear_history))
        .route("/get_history/", post(handlers::get_history))
        .route("/get_history", post(handlers::get_history))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Bind the configured address and serve until Ctrl-C
///
/// # Errors
///
/// Returns error if the provider cannot be built, the address cannot be
/// bound, or the server fails
pub async fn run(config: Config) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CodeproxyError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(
        "Listening on http://{} (model: {})",
        addr,
        state.orchestrator.model()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

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
