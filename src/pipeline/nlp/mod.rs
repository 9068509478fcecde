//! Natural-language interpretation of healthcare queries.
//!
//! Stateless extractors (entities, intent, demographics, temporal, numeric)
//! feed the condition mapper and the FHIR compiler. [`QueryProcessor`] runs
//! the whole chain for one query.

pub mod types;
pub mod entities;
pub mod intent;
pub mod demographics;
pub mod temporal;
pub mod constraints;
pub mod conditions;
pub mod confidence;
pub mod processor;

pub use types::*;
pub use entities::{EntityExtraction, EntityExtractor};
pub use intent::IntentClassifier;
pub use demographics::DemographicsExtractor;
pub use temporal::extract_temporal;
pub use constraints::extract_constraints;
pub use conditions::{ConditionMapper, ICD10_SYSTEM};
pub use confidence::overall_confidence;
pub use processor::{ExampleQuery, QueryProcessor};

use thiserror::Error;

use crate::pipeline::semantic::SemanticError;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Query text is empty")]
    EmptyQuery,

    #[error("Failed to embed query: {0}")]
    Embedding(#[from] SemanticError),
}
