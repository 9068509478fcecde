pub mod api;
pub mod config;
pub mod pipeline;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use config::ServiceConfig;
use pipeline::catalog::{load_concept_file, CatalogError, ConceptCatalog};
use pipeline::nlp::QueryProcessor;
use pipeline::semantic::{
    EmbeddingModel, EntityRecognizer, LexicalEmbedder, NoopRecognizer, SemanticError,
    SemanticServiceClient,
};

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Semantic backend setup failed: {0}")]
    Semantic(#[from] SemanticError),

    #[error("Concept catalog failed to load: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(std::io::Error),

    #[error(transparent)]
    Server(#[from] api::server::ServerError),
}

/// Pick the embedding and NER backends for `config`.
fn semantic_backend(
    config: &ServiceConfig,
) -> Result<(Arc<dyn EmbeddingModel>, Arc<dyn EntityRecognizer>), SemanticError> {
    match &config.semantic_url {
        Some(url) => {
            tracing::info!(url = %url, "Using remote semantic service");
            let client = Arc::new(
                SemanticServiceClient::new(url, config.semantic_timeout_secs)?
                    .with_dimension(config.semantic_dim),
            );
            let embedder: Arc<dyn EmbeddingModel> = client.clone();
            let recognizer: Arc<dyn EntityRecognizer> = client;
            Ok((embedder, recognizer))
        }
        None => {
            tracing::info!("No semantic service configured, using lexical embeddings");
            let embedder: Arc<dyn EmbeddingModel> = Arc::new(LexicalEmbedder::new());
            let recognizer: Arc<dyn EntityRecognizer> = Arc::new(NoopRecognizer);
            Ok((embedder, recognizer))
        }
    }
}

/// Build the shared query processor: backend, catalog, precomputed
/// intent and demographic embeddings.
pub fn build_processor(config: &ServiceConfig) -> Result<Arc<QueryProcessor>, StartupError> {
    let (embedder, recognizer) = semantic_backend(config)?;

    let catalog = match &config.catalog_path {
        Some(path) => {
            let extensions = load_concept_file(path)?;
            ConceptCatalog::with_extensions(embedder.as_ref(), extensions)?
        }
        None => ConceptCatalog::builtin(embedder.as_ref())?,
    };

    let processor = QueryProcessor::new(embedder, recognizer, Arc::new(catalog))?;
    tracing::info!(
        concepts = processor.catalog().len(),
        backend = processor.embedder_name(),
        "Query processor ready"
    );
    Ok(Arc::new(processor))
}

pub fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = ServiceConfig::from_env();

    // The remote client is blocking; build it before entering the runtime.
    let processor = build_processor(&config)?;
    let app = api::api_router(processor, &config.fhir_base_url);

    let runtime = tokio::runtime::Runtime::new().map_err(StartupError::Runtime)?;
    runtime.block_on(api::serve(app, config.bind_addr))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_builds_lexical_processor() {
        let processor = build_processor(&ServiceConfig::default()).unwrap();
        assert_eq!(processor.embedder_name(), "lexical");
        assert_eq!(processor.catalog().len(), 17);
    }

    #[test]
    fn remote_backend_takes_configured_dimension() {
        let config = ServiceConfig {
            semantic_url: Some("http://127.0.0.1:9".into()),
            semantic_dim: 768,
            ..ServiceConfig::default()
        };
        let (embedder, _) = semantic_backend(&config).unwrap();
        assert_eq!(embedder.dimension(), 768);
    }

    #[test]
    fn catalog_path_extends_builtin_concepts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Gout", "icd10": "m10.9", "category": "Rheumatologic",
                 "synonyms": ["gout", "gouty arthritis"]}}]"#
        )
        .unwrap();

        let config = ServiceConfig {
            catalog_path: Some(file.path().to_path_buf()),
            ..ServiceConfig::default()
        };
        let processor = build_processor(&config).unwrap();
        assert_eq!(processor.catalog().len(), 18);
        assert_eq!(processor.catalog().get("gout").unwrap().codes.icd10, "M10.9");
    }

    #[test]
    fn missing_catalog_file_fails_startup() {
        let config = ServiceConfig {
            catalog_path: Some("/nonexistent/fhirquery/concepts.json".into()),
            ..ServiceConfig::default()
        };
        assert!(matches!(
            build_processor(&config),
            Err(StartupError::Catalog(CatalogError::Io(_)))
        ));
    }
}
