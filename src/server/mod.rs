//! HTTP surface — Axum web server for the analysis API.
//!
//! CORS is wide open (origins, methods, and headers reflected, with
//! credentials allowed) for frontend access.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::info;

use crate::estimator::{Estimator, EstimatorConfig};

/// State shared by all route handlers. Nothing here mutates after
/// startup; requests own all of their data.
pub struct ServerState {
    pub estimator: Estimator,
    pub started_at: DateTime<Utc>,
}

pub type AppState = Arc<ServerState>;

impl ServerState {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            estimator: Estimator::new(config),
            started_at: Utc::now(),
        }
    }
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // A literal "*" origin cannot be combined with credentials, so the
    // permissive-with-credentials policy reflects the request instead.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/analyze", post(routes::analyze))
        .route("/health", get(routes::health))
        .route("/", get(routes::root))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until a shutdown signal arrives.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received.");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
