//! HTTP server exposing the brain

pub mod http;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::brain::{Brain, JsonFileStore, StateStore};
use crate::config::Config;

/// Shared server state
#[derive(Clone)]
pub struct ServerState {
    pub brain: Arc<Brain>,
}

impl ServerState {
    pub fn new(brain: Brain) -> Self {
        Self {
            brain: Arc::new(brain),
        }
    }
}

/// Build the router with CORS and request tracing
pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(http::info_handler))
        .route("/baby", get(http::baby_handler))
        .route("/stats", get(http::stats_handler))
        .route("/health", get(http::health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server
pub async fn start(config: &Config) -> Result<()> {
    let data_file = config.data_file()?;
    let store = JsonFileStore::new(&data_file);
    let state = store
        .init()
        .with_context(|| format!("Failed to initialize data file {}", data_file.display()))?;
    info!(
        "Loaded {} trigger(s) and {} teacher(s) from {}",
        state.conversations.len(),
        state.teachers.len(),
        store.describe()
    );

    let app = router(ServerState::new(Brain::new(Arc::new(store))));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Baby API server running on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
