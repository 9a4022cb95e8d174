//! HTTP handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{info, warn};

use super::types::{ErrorResponse, HealthResponse, ServerState};
use crate::models::BatchRequest;

/// `POST /api/extract-imprints`
pub async fn extract_imprints_handler(
    State(state): State<ServerState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("Rejected malformed request body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(rejection.body_text(), 0)),
            )
                .into_response();
        }
    };

    let total_urls = request.urls.len();
    info!("Received extraction request for {} URLs", total_urls);
    match state.extractor.process_batch(request).await {
        Ok(batch) => (StatusCode::OK, Json(batch)).into_response(),
        Err(e) => {
            warn!("Rejected request: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(e.to_string(), total_urls)),
            )
                .into_response()
        }
    }
}

/// `GET /health`
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
