//! HTTP API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.

use std::sync::Arc;

use axum::http::Uri;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::nlp::QueryProcessor;

/// Build the API router around a shared processor.
pub fn api_router(processor: Arc<QueryProcessor>, fhir_base_url: &str) -> Router {
    let ctx = ApiContext::new(processor).with_fhir_base_url(fhir_base_url);
    build_router(ctx)
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/query", post(endpoints::query::process))
        .route("/examples", get(endpoints::examples::list))
        .route("/conditions", get(endpoints::conditions::list))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {uri}"))
}
