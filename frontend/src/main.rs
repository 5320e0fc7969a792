//! Calendar chat front-end
//!
//! Serves a small chat page on port 8501 and answers its messages with a
//! rule-based booking conversation backed by the calendar booking API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod chat;
mod client;
mod config;
mod conversation;
mod error;
mod fields;
mod handlers;

#[cfg(test)]
mod integration_tests;

use chat::ChatService;
use client::BackendClient;
use config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub backend: BackendClient,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let backend = BackendClient::new(&config.backend_url, config.backend_timeout)
            .context("Failed to build backend client")?;

        Ok(Self {
            chat: Arc::new(ChatService::new(backend.clone(), config.settings)),
            backend,
            config: Arc::new(config),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/schedule", get(handlers::schedule))
        .route("/slots", get(handlers::slots))
        .route(
            "/events/:id",
            get(handlers::get_event).delete(handlers::cancel_event),
        )
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,calendar_frontend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting calendar chat front-end...");

    // Load configuration
    let config = Config::from_env();
    config.validate().map_err(anyhow::Error::msg)?;

    let port = config.port;
    tracing::info!(backend_url = %config.backend_url, "Using booking API");

    let state = AppState::new(config)?;
    if !state.backend.ping().await {
        tracing::warn!("Booking API is not reachable yet; chat replies will report errors");
    }

    let app = build_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
