//! HTTP endpoint.
//!
//! Provides two routes:
//! - `POST /api/extract-imprints` - runs one batch (`{"urls": [...]}`)
//! - `GET /health` - liveness check
//!
//! Validation failures answer HTTP 400 with
//! `{success: false, error, total_urls, results: []}`.

mod handlers;
mod types;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::batch::ImprintExtractor;
use handlers::{extract_imprints_handler, health_handler};
pub use types::{ErrorResponse, HealthResponse, ServerState};

/// Builds the endpoint's router.
pub fn router(extractor: ImprintExtractor) -> Router {
    Router::new()
        .route("/api/extract-imprints", post(extract_imprints_handler))
        .route("/health", get(health_handler))
        .with_state(ServerState { extractor })
}

/// Serves the endpoint on `0.0.0.0:<port>` until the process ends.
pub async fn start_server(port: u16, extractor: ImprintExtractor) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind server to port {port}"))?;

    log::info!("Imprint server listening on http://0.0.0.0:{}/", port);
    log::info!("  - Extract: POST http://0.0.0.0:{}/api/extract-imprints", port);
    log::info!("  - Health: GET http://0.0.0.0:{}/health", port);

    axum::serve(listener, router(extractor))
        .await
        .context("Server error")?;

    Ok(())
}
