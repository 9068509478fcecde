//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub concepts: usize,
    pub embedding_backend: String,
}

/// `GET /api/health`: liveness plus the loaded catalog size and backend.
pub async fn check(
    State(ctx): State<ApiContext>,
) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        service: crate::config::APP_NAME,
        version: crate::config::APP_VERSION,
        concepts: ctx.processor.catalog().len(),
        embedding_backend: ctx.processor.embedder_name().to_string(),
    }))
}
