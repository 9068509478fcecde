use std::collections::HashSet;
use std::sync::Arc;

use super::types::{ConditionMatch, EntityType, ExtractedEntity, MatchMethod};
use crate::pipeline::catalog::{Concept, ConceptCatalog};
use crate::pipeline::semantic::cosine_similarity;

pub const ICD10_SYSTEM: &str = "http://hl7.org/fhir/sid/icd-10-cm";

/// Query/concept similarity above which a concept is included without any
/// synonym evidence.
pub const CONDITION_THRESHOLD: f32 = 0.50;

/// Confidence floor for a concept backed by a literal synonym.
pub const SYNONYM_CONFIDENCE_FLOOR: f32 = 0.9;

const CANCER_WORDS: &[&str] = &["cancer", "carcinoma", "tumor", "neoplasm"];
const INFARCT_WORDS: &[&str] = &["infarction", "infarct"];

/// Maps a query and its entities onto catalog conditions.
pub struct ConditionMapper {
    catalog: Arc<ConceptCatalog>,
}

impl ConditionMapper {
    pub fn new(catalog: Arc<ConceptCatalog>) -> Self {
        Self { catalog }
    }

    /// Matched conditions, highest confidence first.
    pub fn map(
        &self,
        query: &str,
        query_embedding: &[f32],
        entities: &[ExtractedEntity],
    ) -> Vec<ConditionMatch> {
        let mut conditions = Vec::new();
        let mut covered: HashSet<String> = HashSet::new();

        for entity in entities {
            if entity.entity_type != EntityType::Condition {
                continue;
            }
            let Some(codes) = &entity.codes else {
                continue;
            };

            let concept = entity.concept_id.as_deref().and_then(|id| self.catalog.get(id));

            // Literal synonym evidence outranks the entity's own score.
            let evidence = concept.and_then(|c| {
                let name = c.canonical_name();
                best_matching_synonym(query, &c.synonyms, &name).map(str::to_owned)
            });
            let (text, confidence, method) = match evidence {
                Some(synonym) => (
                    synonym,
                    entity.confidence.max(SYNONYM_CONFIDENCE_FLOOR),
                    MatchMethod::Synonym,
                ),
                None => (entity.text.clone(), entity.confidence, MatchMethod::Ner),
            };

            conditions.push(ConditionMatch {
                text,
                code: codes.icd10.clone(),
                system: ICD10_SYSTEM.to_string(),
                confidence: confidence.clamp(0.0, 1.0),
                method,
                concept_id: entity.concept_id.clone(),
                category: concept.map(|c| c.category.clone()),
                snomed_code: codes.snomed.clone(),
                umls_cui: codes.umls.clone(),
            });

            covered.insert(entity.text.to_lowercase());
            if let Some(concept) = concept {
                covered.insert(concept.canonical_name().to_lowercase());
            }
        }

        for concept in self.catalog.iter() {
            let name = concept.canonical_name();
            if covered.contains(&name.to_lowercase()) {
                continue;
            }

            let similarity = cosine_similarity(query_embedding, &concept.embedding);
            let synonym = best_matching_synonym(query, &concept.synonyms, &name);

            let (text, confidence, method) = match synonym {
                Some(s) => (
                    s.to_owned(),
                    similarity.max(SYNONYM_CONFIDENCE_FLOOR),
                    MatchMethod::Synonym,
                ),
                None if similarity > CONDITION_THRESHOLD => {
                    (name.clone(), similarity, MatchMethod::Semantic)
                }
                None => continue,
            };

            conditions.push(concept_match(concept, text, confidence, method));
        }

        // Stable: equal confidences keep catalog order.
        conditions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        tracing::debug!(mapped = conditions.len(), "Condition mapping complete");
        conditions
    }
}

fn concept_match(
    concept: &Concept,
    text: String,
    confidence: f32,
    method: MatchMethod,
) -> ConditionMatch {
    ConditionMatch {
        text,
        code: concept.codes.icd10.clone(),
        system: ICD10_SYSTEM.to_string(),
        confidence: confidence.clamp(0.0, 1.0),
        method,
        concept_id: Some(concept.id.clone()),
        category: Some(concept.category.clone()),
        snomed_code: concept.codes.snomed.clone(),
        umls_cui: concept.codes.umls.clone(),
    }
}

/// Literal synonym evidence, strongest kind first: whole synonym as a
/// substring, then every word of a synonym present, then the compound
/// lung-cancer and myocardial-infarction heuristics, then the concept's own
/// canonical name.
///
/// Matching is by substring, so short acronyms ("MI", "RA") also hit
/// inside longer words.
fn best_matching_synonym<'a>(
    query: &str,
    synonyms: &'a [String],
    canonical_name: &'a str,
) -> Option<&'a str> {
    let lower = query.to_lowercase();
    let lowered: Vec<String> = synonyms.iter().map(|s| s.to_lowercase()).collect();

    let pick = |index: Option<usize>| index.map(|i| synonyms[i].as_str());

    if let Some(found) = pick(lowered.iter().position(|s| lower.contains(s.as_str()))) {
        return Some(found);
    }

    if let Some(found) = pick(
        lowered
            .iter()
            .position(|s| s.split_whitespace().all(|word| lower.contains(word))),
    ) {
        return Some(found);
    }

    if lower.contains("lung") && lower.contains("cancer") {
        if let Some(found) = pick(lowered.iter().position(|s| {
            s.contains("lung") && CANCER_WORDS.iter().any(|w| s.contains(w))
        })) {
            return Some(found);
        }
    }

    if lower.contains("myocardial") && INFARCT_WORDS.iter().any(|w| lower.contains(w)) {
        if let Some(found) = pick(lowered.iter().position(|s| {
            s.contains("myocardial") && INFARCT_WORDS.iter().any(|w| s.contains(w))
        })) {
            return Some(found);
        }
    }

    if lower.contains(&canonical_name.to_lowercase()) {
        return Some(canonical_name);
    }

    None
}
