use serde::{Deserialize, Serialize};

use super::SemanticError;

/// A labeled span returned by the entity recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NerSpan {
    pub text: String,
    pub label: String,
    pub score: f32,
    pub start: usize,
    pub end: usize,
}

/// Embedding model abstraction.
///
/// Implementations must be deterministic for identical text and safe to
/// call from several request threads at once.
pub trait EmbeddingModel: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError>;
    fn dimension(&self) -> usize;
    /// Short backend name, reported by the health endpoint.
    fn name(&self) -> &str;
}

/// Named-entity recognition abstraction.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<NerSpan>, SemanticError>;
}

/// Cosine similarity between two embeddings, in [-1, 1].
///
/// Mismatched lengths and zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
