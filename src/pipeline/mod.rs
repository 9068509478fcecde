//! Query interpretation pipeline.
//!
//! `semantic` is the model port, `catalog` the condition ontology, `nlp`
//! the extractors and orchestration, `fhir` the search compiler.

pub mod semantic;
pub mod catalog;
pub mod nlp;
pub mod fhir;
