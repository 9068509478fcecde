//! Shared types for the HTTP API layer.

use std::sync::Arc;

use crate::pipeline::fhir::DEFAULT_FHIR_BASE_URL;
use crate::pipeline::nlp::QueryProcessor;

/// Default `max_results` echoed back when a request omits it.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub processor: Arc<QueryProcessor>,
    pub fhir_base_url: Arc<str>,
}

impl ApiContext {
    pub fn new(processor: Arc<QueryProcessor>) -> Self {
        Self {
            processor,
            fhir_base_url: Arc::from(DEFAULT_FHIR_BASE_URL),
        }
    }

    /// Base used when rendering FHIR search URLs.
    pub fn with_fhir_base_url(mut self, base_url: &str) -> Self {
        self.fhir_base_url = Arc::from(base_url);
        self
    }
}
