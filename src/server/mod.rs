//! HTTP server: the simulation API plus server-rendered pages.
//!
//! API routes live under `/api`; every other path is resolved
//! against the page route table. CORS is limited to the configured origins.

pub mod export;
pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::ServerConfig;

pub use routes::{AppState, ServerState};

/// Build the CORS layer. `*` in the origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        // API routes
        .route("/api/simulations/countries", get(routes::get_countries))
        .route("/api/simulations/run", post(routes::run_simulation))
        .route("/api/simulations/history", get(routes::get_history))
        .route("/api/simulations/model/info", get(routes::get_model_info))
        .route("/api/simulations/model/retrain", post(routes::retrain_model))
        .route(
            "/api/simulations/:id/export/:format",
            get(routes::export_simulation),
        )
        .route(
            "/api/benchmarks/countries",
            get(routes::get_benchmark_countries),
        )
        .route("/api/benchmarks/compare", post(routes::compare_countries))
        .route("/api/narratives/generate", post(routes::generate_narrative))
        .route("/health", get(routes::health))
        // Pages
        .fallback(routes::serve_page)
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Run the server until Ctrl+C.
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<()> {
    let app = build_router(state, &config.cors_origins);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %addr, "Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
