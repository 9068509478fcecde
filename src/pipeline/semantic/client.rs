use serde::{Deserialize, Serialize};

use super::types::{EmbeddingModel, EntityRecognizer, NerSpan};
use super::SemanticError;

/// Embedding dimension of the sentence model the service is expected to run
/// (all-MiniLM-L6-v2).
pub const SERVICE_EMBEDDING_DIM: usize = 384;

/// HTTP client for a remote embedding + NER service.
///
/// Endpoints:
/// - `POST {base}/embed` `{"text": ...}` → `{"embedding": [f32]}`
/// - `POST {base}/ner` `{"text": ...}` → `{"entities": [{"word", "entity_group", "score", "start", "end"}]}`
pub struct SemanticServiceClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
    dimension: usize,
}

impl SemanticServiceClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SemanticError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SemanticError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
            dimension: SERVICE_EMBEDDING_DIM,
        })
    }

    /// Override the expected embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, SemanticError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.client.post(&url).json(body).send().map_err(|e| {
            if e.is_connect() {
                SemanticError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                SemanticError::HttpClient(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                SemanticError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SemanticError::Service {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .map_err(|e| SemanticError::ResponseParsing(e.to_string()))
    }
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct NerResponse {
    entities: Vec<ServiceEntity>,
}

#[derive(Deserialize)]
struct ServiceEntity {
    word: String,
    entity_group: String,
    score: f32,
    start: usize,
    end: usize,
}

impl EmbeddingModel for SemanticServiceClient {
    fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let parsed: EmbedResponse = self.post("/embed", &TextRequest { text })?;

        if parsed.embedding.len() != self.dimension {
            return Err(SemanticError::DimensionMismatch {
                expected: self.dimension,
                actual: parsed.embedding.len(),
            });
        }

        Ok(parsed.embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "semantic-service"
    }
}

impl EntityRecognizer for SemanticServiceClient {
    fn recognize(&self, text: &str) -> Result<Vec<NerSpan>, SemanticError> {
        let parsed: NerResponse = self.post("/ner", &TextRequest { text })?;

        Ok(parsed
            .entities
            .into_iter()
            .map(|e| NerSpan {
                text: e.word,
                label: e.entity_group,
                score: e.score,
                start: e.start,
                end: e.end,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = SemanticServiceClient::new("http://localhost:8090///", 5).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8090");
    }

    #[test]
    fn default_dimension_is_service_dim() {
        let client = SemanticServiceClient::new("http://localhost:8090", 5).unwrap();
        assert_eq!(client.dimension(), SERVICE_EMBEDDING_DIM);
        assert_eq!(client.with_dimension(768).dimension(), 768);
    }

    #[test]
    fn unreachable_service_is_an_error() {
        // Port 9 (discard) is closed on test machines.
        let client = SemanticServiceClient::new("http://127.0.0.1:9", 2).unwrap();
        assert!(client.embed("diabetes").is_err());
        assert!(client.recognize("diabetes").is_err());
    }

    #[test]
    fn ner_response_deserializes() {
        let json = r#"{"entities":[{"word":"asthma","entity_group":"Disease_disorder","score":0.98,"start":14,"end":20}]}"#;
        let parsed: NerResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.entities.len(), 1);
        assert_eq!(parsed.entities[0].word, "asthma");
        assert_eq!(parsed.entities[0].end, 20);
    }
}
