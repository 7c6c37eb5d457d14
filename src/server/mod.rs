//! HTTP boundary of the completion gateway.
//!
//! Routes:
//! - `POST /api/chat`: one dialogue turn, relayed to the upstream model
//! - `GET /api/health`: liveness

mod handlers;

pub use handlers::*;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::error::AppResult;
use crate::gateway::CompletionClient;

/// Application state shared across handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Upstream completion client.
    pub client: CompletionClient,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, client: CompletionClient) -> Self {
        if !client.has_credentials() {
            error!("SOCRATIC_API_KEY is not set; every chat request will fail until it is");
        }
        Self { config, client }
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;

/// Build the router with tracing and CORS layers
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/chat", post(handle_chat))
        .route("/api/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT]),
        )
        .with_state(state)
}

/// Bind `config.server.bind_addr` and serve until the process is stopped
pub async fn serve(config: Config) -> AppResult<()> {
    let client = CompletionClient::new(&config.upstream, config.request.clone())?;
    let addr = config.server.bind_addr;
    info!(
        base_url = %client.base_url(),
        model = %client.model(),
        "Completion client initialized"
    );

    let state = Arc::new(AppState::new(config, client));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Gateway listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
