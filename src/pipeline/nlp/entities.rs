use std::sync::Arc;

use super::types::{EntitySource, EntityType, ExtractedEntity, RawEntity};
use super::QueryError;
use crate::pipeline::catalog::ConceptCatalog;
use crate::pipeline::semantic::{cosine_similarity, EmbeddingModel, EntityRecognizer};

/// Query/concept similarity a concept must exceed to be considered by the
/// fallback path.
pub const FALLBACK_SIMILARITY_THRESHOLD: f32 = 0.6;

/// Result of entity extraction for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityExtraction {
    pub entities: Vec<ExtractedEntity>,
    pub raw: Vec<RawEntity>,
    pub source: EntitySource,
}

/// Finds medical entities: recognizer first, catalog similarity when the
/// recognizer yields nothing.
pub struct EntityExtractor {
    embedder: Arc<dyn EmbeddingModel>,
    recognizer: Arc<dyn EntityRecognizer>,
    catalog: Arc<ConceptCatalog>,
}

impl EntityExtractor {
    pub fn new(
        embedder: Arc<dyn EmbeddingModel>,
        recognizer: Arc<dyn EntityRecognizer>,
        catalog: Arc<ConceptCatalog>,
    ) -> Self {
        Self {
            embedder,
            recognizer,
            catalog,
        }
    }

    /// Extract entities from raw text, embedding it first.
    pub fn extract(&self, query: &str) -> Result<Vec<ExtractedEntity>, QueryError> {
        let query_embedding = self.embedder.embed(query)?;
        Ok(self.extract_detailed(query, &query_embedding)?.entities)
    }

    pub fn extract_detailed(
        &self,
        query: &str,
        query_embedding: &[f32],
    ) -> Result<EntityExtraction, QueryError> {
        let raw = match self.recognizer.recognize(query) {
            Ok(spans) => spans
                .into_iter()
                .map(|span| RawEntity {
                    mapped_type: EntityType::from_label(&span.label),
                    confidence: span.score.clamp(0.0, 1.0),
                    text: span.text,
                    label: span.label,
                    start: span.start,
                    end: span.end,
                })
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "NER extraction failed, using similarity fallback");
                Vec::new()
            }
        };

        let entities: Vec<ExtractedEntity> = raw
            .iter()
            .map(|r| ExtractedEntity {
                text: r.text.clone(),
                entity_type: r.mapped_type,
                confidence: r.confidence,
                start: r.start,
                end: r.end,
                concept_id: None,
                codes: None,
            })
            .collect();

        if !entities.is_empty() {
            return Ok(EntityExtraction {
                entities,
                raw,
                source: EntitySource::Ner,
            });
        }

        let entities = self.similarity_fallback(query, query_embedding)?;
        Ok(EntityExtraction {
            entities,
            raw,
            source: EntitySource::SimilarityFallback,
        })
    }

    /// Tag concepts that are both close to the query and literally present
    /// through one of their synonyms.
    fn similarity_fallback(
        &self,
        query: &str,
        query_embedding: &[f32],
    ) -> Result<Vec<ExtractedEntity>, QueryError> {
        let mut entities = Vec::new();

        for concept in self.catalog.iter() {
            let similarity = cosine_similarity(query_embedding, &concept.embedding);
            if similarity <= FALLBACK_SIMILARITY_THRESHOLD {
                continue;
            }

            let mut best: Option<(&str, usize, usize)> = None;
            let mut best_score = 0.0f32;

            for synonym in &concept.synonyms {
                let Some((start, end)) = find_ignore_case(query, synonym) else {
                    continue;
                };
                let synonym_embedding = self.embedder.embed(synonym)?;
                let score = cosine_similarity(query_embedding, &synonym_embedding);
                if score > best_score {
                    best_score = score;
                    best = Some((synonym, start, end));
                }
            }

            let Some((synonym, start, end)) = best else {
                continue;
            };

            entities.push(ExtractedEntity {
                text: synonym.to_string(),
                entity_type: EntityType::Condition,
                confidence: similarity.clamp(0.0, 1.0),
                start,
                end,
                concept_id: Some(concept.id.clone()),
                codes: Some(concept.codes.clone()),
            });
        }

        tracing::debug!(found = entities.len(), "Similarity fallback complete");
        Ok(entities)
    }
}

/// Case-insensitive search returning byte offsets into `haystack` itself.
/// Lowercasing can change a character's byte length, so offsets taken from a
/// lowercased copy would not slice the original.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }

    'start: for (start, _) in haystack.char_indices() {
        let mut matched = 0;
        for (offset, c) in haystack[start..].char_indices() {
            for lc in c.to_lowercase() {
                if needle.get(matched) != Some(&lc) {
                    continue 'start;
                }
                matched += 1;
            }
            if matched == needle.len() {
                return Some((start, start + offset + c.len_utf8()));
            }
        }
        return None;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::semantic::{
        LexicalEmbedder, MockRecognizer, NerSpan, NoopRecognizer, SemanticError,
    };

    fn catalog(embedder: &LexicalEmbedder) -> Arc<ConceptCatalog> {
        Arc::new(ConceptCatalog::builtin(embedder).unwrap())
    }

    fn extractor(recognizer: Arc<dyn EntityRecognizer>) -> EntityExtractor {
        let embedder = LexicalEmbedder::new();
        let catalog = catalog(&embedder);
        EntityExtractor::new(Arc::new(embedder), recognizer, catalog)
    }

    fn span(text: &str, label: &str, score: f32, start: usize) -> NerSpan {
        NerSpan {
            text: text.into(),
            label: label.into(),
            score,
            start,
            end: start + text.len(),
        }
    }

    /// Lexical embedder that swaps one exact text for another before
    /// embedding, to pin a query onto a concept.
    struct PinnedEmbedder {
        inner: LexicalEmbedder,
        text: &'static str,
        pinned: &'static str,
    }

    impl EmbeddingModel for PinnedEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
            if text == self.text {
                self.inner.embed(self.pinned)
            } else {
                self.inner.embed(text)
            }
        }
        fn dimension(&self) -> usize {
            self.inner.dimension()
        }
        fn name(&self) -> &str {
            "pinned"
        }
    }

    #[test]
    fn ner_spans_are_mapped() {
        let recognizer = MockRecognizer::new(vec![
            span("asthma", "Disease", 0.97, 19),
            span("albuterol", "Chemical", 0.91, 31),
        ]);
        let ex = extractor(Arc::new(recognizer));
        let result = ex
            .extract_detailed("patients treated for asthma with albuterol", &[])
            .unwrap();

        assert_eq!(result.source, EntitySource::Ner);
        assert_eq!(result.entities.len(), 2);
        assert_eq!(result.entities[0].entity_type, EntityType::Condition);
        assert_eq!(result.entities[1].entity_type, EntityType::Medication);
        assert_eq!(result.raw.len(), 2);
        assert_eq!(result.raw[1].label, "Chemical");
    }

    #[test]
    fn unmapped_labels_are_kept_as_general() {
        let recognizer = MockRecognizer::new(vec![span("HeLa", "CellLine", 0.8, 0)]);
        let ex = extractor(Arc::new(recognizer));
        let entities = ex.extract("HeLa cells").unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].entity_type, EntityType::General);
    }

    #[test]
    fn ner_scores_are_clamped() {
        let recognizer = MockRecognizer::new(vec![span("asthma", "Disease", 1.7, 0)]);
        let ex = extractor(Arc::new(recognizer));
        let entities = ex.extract("asthma").unwrap();
        assert_eq!(entities[0].confidence, 1.0);
    }

    #[test]
    fn empty_ner_uses_fallback() {
        let ex = extractor(Arc::new(NoopRecognizer));
        let result = ex
            .extract_detailed("Show me all diabetic patients over 50", &[0.0; 4])
            .unwrap();
        assert_eq!(result.source, EntitySource::SimilarityFallback);
        assert!(result.raw.is_empty());
    }

    #[test]
    fn failing_ner_degrades_to_fallback() {
        let ex = extractor(Arc::new(MockRecognizer::failing("model offline")));
        let result = ex.extract_detailed("patients with asthma", &[]).unwrap();
        assert_eq!(result.source, EntitySource::SimilarityFallback);
        assert!(result.raw.is_empty());
    }

    #[test]
    fn fallback_tags_present_synonym_of_similar_concept() {
        let lexical = LexicalEmbedder::new();
        let catalog = Arc::new(ConceptCatalog::builtin(&lexical).unwrap());
        let query = "Find patients with allergic asthma";
        let embedder = PinnedEmbedder {
            inner: lexical,
            text: query,
            pinned: "asthma asthma bronchial allergic respiratory wheezing bronchospasm \
                     bronchial asthma allergic asthma exercise induced asthma wheezing bronchospasm",
        };
        let ex = EntityExtractor::new(Arc::new(embedder), Arc::new(NoopRecognizer), catalog);

        let entities = ex.extract(query).unwrap();

        let asthma = entities
            .iter()
            .find(|e| e.concept_id.as_deref() == Some("asthma"))
            .expect("asthma tagged");
        assert_eq!(asthma.entity_type, EntityType::Condition);
        assert_eq!(asthma.codes.as_ref().unwrap().icd10, "J45.9");
        assert_eq!(&query[asthma.start..asthma.end].to_lowercase(), &asthma.text.to_lowercase());
        assert!(asthma.confidence > FALLBACK_SIMILARITY_THRESHOLD);
    }

    #[test]
    fn case_insensitive_find_reports_original_offsets() {
        let query = "İzmir patients with Allergic Asthma";
        let (start, end) = find_ignore_case(query, "allergic asthma").unwrap();
        assert_eq!(&query[start..end], "Allergic Asthma");

        assert_eq!(find_ignore_case("ASTHMA", "asthma"), Some((0, 6)));
        assert_eq!(find_ignore_case("patients with copd", "asthma"), None);
        assert_eq!(find_ignore_case("asth", "asthma"), None);
        assert_eq!(find_ignore_case("anything", ""), None);
    }

    #[test]
    fn fallback_offsets_survive_case_folding_length_change() {
        let lexical = LexicalEmbedder::new();
        let catalog = Arc::new(ConceptCatalog::builtin(&lexical).unwrap());
        let query = "İzmir patients with Allergic Asthma";
        let embedder = PinnedEmbedder {
            inner: lexical,
            text: query,
            pinned: "asthma asthma bronchial allergic respiratory wheezing bronchospasm \
                     bronchial asthma allergic asthma exercise induced asthma wheezing bronchospasm",
        };
        let ex = EntityExtractor::new(Arc::new(embedder), Arc::new(NoopRecognizer), catalog);

        let entities = ex.extract(query).unwrap();

        let asthma = entities
            .iter()
            .find(|e| e.concept_id.as_deref() == Some("asthma"))
            .expect("asthma tagged");
        let slice = &query[asthma.start..asthma.end];
        assert_eq!(slice.to_lowercase(), asthma.text.to_lowercase());
        assert!(slice.ends_with("Asthma"));
    }

    #[test]
    fn fallback_skips_dissimilar_queries() {
        let ex = extractor(Arc::new(NoopRecognizer));
        let entities = ex.extract("What is the weather like today").unwrap();
        assert!(entities.is_empty());
    }
}
