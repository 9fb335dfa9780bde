// ==============================================================================
// main.rs - seqr Gateway Entry Point
// ==============================================================================
// Description: Axum web server for seqr pages, project API and variant search
//              validation
// Author: Matt Barham
// Created: 2025-11-06
// Modified: 2026-10-17
// Version: 2.0.0
// ==============================================================================

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    routing::get,
    Router,
};
use clap::Parser;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod handlers;
mod middleware;
mod models;
mod routes;
mod state;

use config::{Config, LogFormat};
use state::AppState;

/// Search forms are small; anything larger is not a browser form submission
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before parsing env-backed arguments
    dotenvy::dotenv().ok();
    let config = Config::parse();

    init_tracing(config.log_format);

    info!("Starting seqr Gateway v{}", env!("CARGO_PKG_VERSION"));

    // Initialize application state
    let state = AppState::new(&config)
        .await
        .context("Failed to initialize application state")?;

    // Build router with all endpoints
    let app = build_router(state, &config.allowed_origins());

    // Bind server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server
    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "seqr_server=info,seqr_search=info,tower_http=info".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().with_target(false).compact())
            .init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let allowed_origins: Vec<_> = cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        // Allow specific origins from environment
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_credentials(false)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-remote-user"),
        ])
        .expose_headers([header::CONTENT_TYPE]);

    // Page and API route table, plus operational endpoints
    let app_routes = routes::register(Router::new())
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check));

    app_routes
        .layer(
            ServiceBuilder::new()
                // Request tracing
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}
