//! Showcase queries for client onboarding.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::nlp::ExampleQuery;

#[derive(Serialize)]
pub struct ExamplesResponse {
    pub success: bool,
    pub examples: Vec<ExampleQuery>,
}

/// `GET /api/examples`
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<ExamplesResponse>, ApiError> {
    Ok(Json(ExamplesResponse {
        success: true,
        examples: ctx.processor.example_queries(),
    }))
}
