//! Natural-language query endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, DEFAULT_MAX_RESULTS};
use crate::pipeline::fhir::render_url;
use crate::pipeline::nlp::ProcessedQuery;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub max_results: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    pub request_id: String,
    pub query: String,
    pub entities: ProcessedQuery,
    pub fhir_url: String,
    pub max_results: u32,
    pub processed_at: String,
}

/// `POST /api/query`: interpret a question and compile it to a FHIR search.
///
/// The pipeline calls the embedding backend synchronously, so it runs on the
/// blocking pool.
pub async fn process(
    State(ctx): State<ApiContext>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let query = req.query.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Missing required field: query".into()));
    }
    let query = query.to_string();
    let max_results = req.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
    let request_id = uuid::Uuid::new_v4().to_string();

    tracing::info!(request_id = %request_id, query = %query, "Processing query");

    let processor = ctx.processor.clone();
    let pipeline_query = query.clone();
    let entities =
        tokio::task::spawn_blocking(move || processor.process(&pipeline_query)).await??;

    let fhir_url = render_url(&ctx.fhir_base_url, &entities.fhir_params);

    tracing::debug!(request_id = %request_id, fhir_url = %fhir_url, "Query compiled");

    Ok(Json(QueryResponse {
        success: true,
        request_id,
        query,
        entities,
        fhir_url,
        max_results,
        processed_at: chrono::Utc::now().to_rfc3339(),
    }))
}
