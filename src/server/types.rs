//! Server state and response types.

use serde::Serialize;

use crate::batch::ImprintExtractor;
use crate::models::ImprintResult;

/// Shared state of the HTTP endpoint.
#[derive(Clone)]
pub struct ServerState {
    pub extractor: ImprintExtractor,
}

/// Body returned when a request is rejected before processing.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub total_urls: usize,
    pub results: Vec<ImprintResult>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, total_urls: usize) -> Self {
        Self {
            success: false,
            error: error.into(),
            total_urls,
            results: Vec::new(),
        }
    }
}

/// Health check body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}
