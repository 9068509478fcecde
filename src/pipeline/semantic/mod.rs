//! Semantic capability port.
//!
//! The pipeline never talks to a model directly. Everything above this
//! module depends on two narrow traits, [`EmbeddingModel`] and
//! [`EntityRecognizer`], injected at construction time:
//!
//! - [`SemanticServiceClient`]: HTTP client for a remote embedding/NER service
//! - [`LexicalEmbedder`]: offline token-hashing embedder (no model required)
//! - [`NoopRecognizer`] / [`MockRecognizer`]: recognizers for offline use and tests

pub mod types;
pub mod embedder;
pub mod recognizer;
pub mod client;

pub use types::*;
pub use embedder::*;
pub use recognizer::*;
pub use client::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SemanticError {
    #[error("Semantic service is not reachable at {0}")]
    Connection(String),

    #[error("Semantic service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Entity recognition failed: {0}")]
    Recognition(String),
}
