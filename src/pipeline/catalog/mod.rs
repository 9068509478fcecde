//! Concept catalog: the condition ontology with precomputed embeddings.

pub mod loader;
pub mod ontology;
pub mod registry;

pub use loader::{is_valid_icd10, load_concept_file, ConceptSpec};
pub use ontology::builtin_specs;
pub use registry::{Concept, ConceptCatalog, ConceptCodes};

use thiserror::Error;

use crate::pipeline::semantic::SemanticError;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to embed concept: {0}")]
    Embedding(#[from] SemanticError),

    #[error("Failed to read concept file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse concept file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid concept definition: {0}")]
    InvalidConcept(String),

    #[error("Duplicate concept id: {0}")]
    DuplicateConcept(String),
}
