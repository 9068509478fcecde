//! Condition listing for client auto-complete.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::catalog::Concept;

/// Synonyms listed per concept.
const SYNONYMS_PER_CONCEPT: usize = 3;

#[derive(Debug, Serialize)]
pub struct ConditionEntry {
    pub text: String,
    pub code: String,
    pub display: String,
    pub category: String,
    pub snomed_code: Option<String>,
    pub umls_cui: Option<String>,
    pub is_synonym: bool,
}

#[derive(Serialize)]
pub struct ConditionsResponse {
    pub success: bool,
    pub conditions: Vec<ConditionEntry>,
}

/// `GET /api/conditions`: every concept, each followed by its first
/// synonyms.
pub async fn list(
    State(ctx): State<ApiContext>,
) -> Result<Json<ConditionsResponse>, ApiError> {
    let conditions = ctx
        .processor
        .catalog()
        .iter()
        .flat_map(entries_for)
        .collect();

    Ok(Json(ConditionsResponse {
        success: true,
        conditions,
    }))
}

fn entries_for(concept: &Concept) -> Vec<ConditionEntry> {
    let entry = |text: String, display: String, is_synonym: bool| ConditionEntry {
        text,
        code: concept.codes.icd10.clone(),
        display,
        category: concept.category.clone(),
        snomed_code: concept.codes.snomed.clone(),
        umls_cui: concept.codes.umls.clone(),
        is_synonym,
    };

    let primary_display = if concept.description.is_empty() {
        format!("Condition {}", concept.codes.icd10)
    } else {
        concept.description.clone()
    };

    let mut entries = vec![entry(concept.canonical_name(), primary_display, false)];
    for synonym in concept.synonyms.iter().take(SYNONYMS_PER_CONCEPT) {
        entries.push(entry(
            synonym.clone(),
            format!("{synonym} ({})", concept.description),
            true,
        ));
    }
    entries
}
