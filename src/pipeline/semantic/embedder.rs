use super::types::EmbeddingModel;
use super::SemanticError;

/// Default dimension of the lexical embedding space.
pub const LEXICAL_DIM: usize = 2048;

/// Offline embedding model based on token hashing.
///
/// Each lower-cased alphanumeric token is hashed (FNV-1a) into one of
/// `dimension` buckets and the bucket counts are L2-normalized. Cosine
/// similarity between two such vectors measures token overlap, which is
/// enough to drive the pipeline without a neural model and makes every
/// score in the test suite reproducible.
pub struct LexicalEmbedder {
    dimension: usize,
}

impl LexicalEmbedder {
    pub fn new() -> Self {
        Self::with_dimension(LEXICAL_DIM)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }
}

impl Default for LexicalEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingModel for LexicalEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        Ok(lexical_vector(text, self.dimension))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "lexical"
    }
}

/// Split text into lower-cased alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn lexical_vector(text: &str, dim: usize) -> Vec<f32> {
    let mut vec = vec![0.0f32; dim];

    for token in tokenize(text) {
        let bucket = (fnv1a(token.as_bytes()) % dim as u64) as usize;
        vec[bucket] += 1.0;
    }

    // L2 normalize
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in &mut vec {
            *val /= norm;
        }
    }

    vec
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}
