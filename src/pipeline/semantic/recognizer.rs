use super::types::{EntityRecognizer, NerSpan};
use super::SemanticError;

/// Recognizer for deployments without an NER model. Always returns no
/// spans, which routes entity extraction to the similarity fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecognizer;

impl EntityRecognizer for NoopRecognizer {
    fn recognize(&self, _text: &str) -> Result<Vec<NerSpan>, SemanticError> {
        Ok(Vec::new())
    }
}

/// Mock recognizer for testing: returns scripted spans or a scripted failure.
pub struct MockRecognizer {
    spans: Vec<NerSpan>,
    failure: Option<String>,
}

impl MockRecognizer {
    pub fn new(spans: Vec<NerSpan>) -> Self {
        Self {
            spans,
            failure: None,
        }
    }

    /// A recognizer whose every call fails with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            spans: Vec::new(),
            failure: Some(message.to_string()),
        }
    }
}

impl EntityRecognizer for MockRecognizer {
    fn recognize(&self, _text: &str) -> Result<Vec<NerSpan>, SemanticError> {
        match &self.failure {
            Some(message) => Err(SemanticError::Recognition(message.clone())),
            None => Ok(self.spans.clone()),
        }
    }
}
