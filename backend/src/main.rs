//! Calendar booking API
//!
//! Books, inspects and cancels appointments on a calendar and proposes free
//! slots. Uses hexagonal (ports & adapters) architecture: the calendar is a
//! port with an in-memory and a Google Calendar adapter.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod config;
mod domain;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{GoogleCalendarClient, InMemoryCalendar};
use app::SchedulingService;
use config::{CalendarProviderKind, Config};
use domain::ports::CalendarProvider;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub scheduling_service: Arc<SchedulingService<dyn CalendarProvider>>,
}

/// Requests per minute allowed per client IP, per endpoint
mod rate_limits {
    pub const CREATE_EVENT: u64 = 10;
    pub const AVAILABILITY: u64 = 30;
    pub const SUGGEST_SLOTS: u64 = 20;
    pub const GET_EVENT: u64 = 15;
    pub const CANCEL_EVENT: u64 = 10;
}

/// Build the API router with per-endpoint rate limits.
///
/// Rate limiting keys on the peer address, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // N requests per minute: burst of N, one token back every 60/N seconds
    let per_minute = |requests: u64| {
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_millisecond(60_000 / requests)
            .burst_size(requests as u32)
            .finish()
            .map(|config| GovernorLayer {
                config: Arc::new(config),
            })
            .with_context(|| format!("Failed to build rate limit of {}/minute", requests))
    };

    let app = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/events",
            post(handlers::create_event).layer(per_minute(rate_limits::CREATE_EVENT)?),
        )
        .route(
            "/events/:id",
            get(handlers::get_event)
                .layer(per_minute(rate_limits::GET_EVENT)?)
                .merge(delete(handlers::cancel_event).layer(per_minute(rate_limits::CANCEL_EVENT)?)),
        )
        .route(
            "/availability",
            get(handlers::check_availability).layer(per_minute(rate_limits::AVAILABILITY)?),
        )
        .route(
            "/suggest-slots",
            get(handlers::suggest_slots).layer(per_minute(rate_limits::SUGGEST_SLOTS)?),
        )
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn calendar_from_config(config: &Config) -> Arc<dyn CalendarProvider> {
    match config.calendar_provider {
        CalendarProviderKind::Memory => Arc::new(InMemoryCalendar::new(
            config.calendar_id.clone(),
            config.memory_page_size,
        )),
        CalendarProviderKind::Google => Arc::new(GoogleCalendarClient::new(
            config.google_api_url.clone(),
            config.calendar_id.clone(),
            config.google_access_token.clone().unwrap_or_default(),
        )),
    }
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
                .unwrap_or_else(|_| "info,calendar_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting calendar booking API...");

    // Load configuration
    let config = Config::from_env();
    config.validate().map_err(anyhow::Error::msg)?;

    let calendar = calendar_from_config(&config);
    tracing::info!(
        provider = calendar.name(),
        calendar_id = %config.calendar_id,
        "Calendar provider ready"
    );

    let state = AppState {
        scheduling_service: Arc::new(SchedulingService::new(calendar)),
    };
    let app = build_router(state)?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    Ok(())
}
