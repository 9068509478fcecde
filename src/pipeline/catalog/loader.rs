use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::CatalogError;

/// Letter + 2 digits + optional decimal part.
static ICD10_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][0-9]{2}(\.[0-9A-Z]*)?$").expect("Invalid ICD-10 regex"));

/// A concept definition before embedding: built-in table rows and entries
/// of a catalog extension file share this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptSpec {
    pub name: String,
    pub icd10: String,
    #[serde(default)]
    pub snomed: Option<String>,
    #[serde(default)]
    pub umls: Option<String>,
    pub category: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl ConceptSpec {
    /// Validate and canonicalize a definition.
    ///
    /// Name becomes a lower-case `snake_case` id, the ICD-10 code is
    /// upper-cased, synonyms are trimmed and de-duplicated keeping the first
    /// occurrence. Malformed ICD-10 codes are logged, not rejected.
    pub fn normalize(self) -> Result<ConceptSpec, CatalogError> {
        let name = self.name.trim().to_lowercase().replace(' ', "_");
        let icd10 = self.icd10.trim().to_uppercase();
        let category = self.category.trim().to_lowercase();

        if name.is_empty() || icd10.is_empty() || category.is_empty() {
            return Err(CatalogError::InvalidConcept(format!(
                "name, icd10 and category are required (got name={:?}, icd10={:?}, category={:?})",
                self.name, self.icd10, self.category
            )));
        }

        if !is_valid_icd10(&icd10) {
            tracing::warn!(concept = %name, icd10 = %icd10, "ICD-10 code may not be valid format");
        }

        let mut seen = HashSet::new();
        let synonyms = self
            .synonyms
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(s.clone()))
            .collect();

        Ok(ConceptSpec {
            name,
            icd10,
            snomed: non_empty(self.snomed),
            umls: non_empty(self.umls),
            category,
            synonyms,
            description: self.description.trim().to_string(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read extra concept definitions from a JSON array file.
pub fn load_concept_file(path: &Path) -> Result<Vec<ConceptSpec>, CatalogError> {
    let raw = std::fs::read_to_string(path)?;
    let specs: Vec<ConceptSpec> = serde_json::from_str(&raw)?;
    tracing::info!(path = %path.display(), count = specs.len(), "Loaded catalog extension file");
    Ok(specs)
}

/// Whether a code has the `A00` / `A00.0` shape of ICD-10.
pub fn is_valid_icd10(code: &str) -> bool {
    ICD10_PATTERN.is_match(&code.to_uppercase())
}
