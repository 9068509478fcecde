use std::collections::HashMap;

use serde::Serialize;

use super::loader::ConceptSpec;
use super::ontology::builtin_specs;
use super::CatalogError;
use crate::pipeline::semantic::EmbeddingModel;

/// Terminology codes attached to a concept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConceptCodes {
    pub icd10: String,
    pub snomed: Option<String>,
    pub umls: Option<String>,
}

/// One condition concept with its precomputed embedding.
#[derive(Debug, Clone, Serialize)]
pub struct Concept {
    pub id: String,
    pub category: String,
    pub codes: ConceptCodes,
    pub synonyms: Vec<String>,
    pub description: String,
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

impl Concept {
    /// Human-readable name: the id with underscores as spaces.
    pub fn canonical_name(&self) -> String {
        self.id.replace('_', " ")
    }

    /// Text embedded to represent the concept.
    fn embedding_text(spec: &ConceptSpec) -> String {
        format!(
            "{} {} {}",
            spec.name.replace('_', " "),
            spec.description,
            spec.synonyms.join(" ")
        )
    }
}

/// Immutable catalog of condition concepts.
///
/// Built once at startup; iteration follows declaration order (built-in
/// concepts first, then extension concepts in file order).
pub struct ConceptCatalog {
    concepts: Vec<Concept>,
    index: HashMap<String, usize>,
}

impl ConceptCatalog {
    /// Normalize, embed and index the given definitions.
    pub fn build(
        embedder: &dyn EmbeddingModel,
        specs: Vec<ConceptSpec>,
    ) -> Result<Self, CatalogError> {
        let mut concepts = Vec::with_capacity(specs.len());
        let mut index = HashMap::with_capacity(specs.len());

        for spec in specs {
            let spec = spec.normalize()?;
            if index.contains_key(&spec.name) {
                return Err(CatalogError::DuplicateConcept(spec.name));
            }

            let embedding = embedder.embed(&Concept::embedding_text(&spec))?;

            index.insert(spec.name.clone(), concepts.len());
            concepts.push(Concept {
                id: spec.name,
                category: spec.category,
                codes: ConceptCodes {
                    icd10: spec.icd10,
                    snomed: spec.snomed,
                    umls: spec.umls,
                },
                synonyms: spec.synonyms,
                description: spec.description,
                embedding,
            });
        }

        tracing::info!(
            concepts = concepts.len(),
            backend = embedder.name(),
            "Concept catalog built"
        );

        Ok(Self { concepts, index })
    }

    /// The built-in ontology only.
    pub fn builtin(embedder: &dyn EmbeddingModel) -> Result<Self, CatalogError> {
        Self::build(embedder, builtin_specs())
    }

    /// The built-in ontology followed by extension definitions.
    pub fn with_extensions(
        embedder: &dyn EmbeddingModel,
        extensions: Vec<ConceptSpec>,
    ) -> Result<Self, CatalogError> {
        let mut specs = builtin_specs();
        specs.extend(extensions);
        Self::build(embedder, specs)
    }

    pub fn get(&self, id: &str) -> Option<&Concept> {
        self.index.get(id).map(|&i| &self.concepts[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.iter()
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}
