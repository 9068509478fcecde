use super::types::{AgeGroup, Demographics, Gender};
use crate::pipeline::semantic::{cosine_similarity, EmbeddingModel, SemanticError};

/// Term/query similarity above which a gender term qualifies without
/// appearing literally.
pub const GENDER_THRESHOLD: f32 = 0.65;

static GENDER_TERMS: &[(Gender, &[&str])] = &[
    (
        Gender::Male,
        &["male", "man", "men", "gentleman", "masculine", "boy", "guy"],
    ),
    (
        Gender::Female,
        &["female", "woman", "women", "lady", "ladies", "feminine", "girl", "gal"],
    ),
];

static AGE_GROUP_TERMS: &[(AgeGroup, &[&str])] = &[
    (
        AgeGroup::Pediatric,
        &["child", "children", "pediatric", "kid", "infant", "baby", "toddler"],
    ),
    (
        AgeGroup::Adolescent,
        &["teenager", "adolescent", "teen", "youth", "young adult"],
    ),
    (AgeGroup::Adult, &["adult", "grown-up", "middle-aged", "mature"]),
    (
        AgeGroup::Elderly,
        &["elderly", "senior", "geriatric", "old", "aged", "older adult"],
    ),
];

/// Gender and age-group extraction.
pub struct DemographicsExtractor {
    gender_embeddings: Vec<Vec<Vec<f32>>>,
}

impl DemographicsExtractor {
    pub fn new(embedder: &dyn EmbeddingModel) -> Result<Self, SemanticError> {
        let gender_embeddings = GENDER_TERMS
            .iter()
            .map(|(_, terms)| terms.iter().map(|t| embedder.embed(t)).collect())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { gender_embeddings })
    }

    pub fn extract(&self, query: &str, query_embedding: &[f32]) -> Demographics {
        let lower = query.to_lowercase();
        let mut demographics = Demographics::default();

        // Single best term across both genders. A literal hit qualifies the
        // term but its similarity still has to beat the running best.
        let mut best_gender = None;
        let mut best_confidence = 0.0f32;

        for ((gender, terms), embeddings) in GENDER_TERMS.iter().zip(&self.gender_embeddings) {
            for (term, embedding) in terms.iter().zip(embeddings) {
                let similarity = cosine_similarity(query_embedding, embedding);
                let qualifies = similarity > GENDER_THRESHOLD || lower.contains(term);

                if qualifies && similarity > best_confidence {
                    best_gender = Some(*gender);
                    best_confidence = similarity;
                }
            }
        }

        if let Some(gender) = best_gender {
            demographics.gender = Some(gender);
            demographics.gender_confidence = Some(best_confidence.clamp(0.0, 1.0));
        }

        demographics.age_group = AGE_GROUP_TERMS
            .iter()
            .find(|(_, terms)| terms.iter().any(|term| lower.contains(term)))
            .map(|(group, _)| *group);

        demographics
    }
}
