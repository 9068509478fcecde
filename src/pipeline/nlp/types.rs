use chrono::NaiveDate;
use serde::Serialize;

use crate::pipeline::catalog::ConceptCodes;
use crate::pipeline::fhir::CompiledQuery;

// ═══════════════════════════════════════════
// Entities
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Condition,
    Medication,
    Procedure,
    Biomarker,
    Organism,
    Genetic,
    General,
}

impl EntityType {
    /// Map a recognizer label (any case) to an entity type.
    ///
    /// Covers the BioBERT-style labels (`Disease`, `Chemical`, ...) and the
    /// clinical NER labels (`Disease_disorder`, `Medication`,
    /// `Diagnostic_procedure`, ...). Unknown labels map to `General`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "disease" | "disease_disorder" => EntityType::Condition,
            "chemical" | "medication" => EntityType::Medication,
            "gene" | "protein" => EntityType::Biomarker,
            "species" => EntityType::Organism,
            "dna" | "rna" => EntityType::Genetic,
            "procedure" | "diagnostic_procedure" | "therapeutic_procedure" => {
                EntityType::Procedure
            }
            _ => EntityType::General,
        }
    }
}

/// A medical entity found in the query text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedEntity {
    pub text: String,
    pub entity_type: EntityType,
    pub confidence: f32,
    pub start: usize,
    pub end: usize,
    /// Catalog concept this entity was resolved against, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codes: Option<ConceptCodes>,
}

/// A recognizer span exactly as returned, with its mapped type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawEntity {
    pub text: String,
    pub label: String,
    pub confidence: f32,
    pub start: usize,
    pub end: usize,
    pub mapped_type: EntityType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntitySource {
    Ner,
    SimilarityFallback,
}

// ═══════════════════════════════════════════
// Intent
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SearchPatients,
    CountPatients,
    AnalyzeConditions,
    CompareTreatments,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::SearchPatients => "search_patients",
            Intent::CountPatients => "count_patients",
            Intent::AnalyzeConditions => "analyze_conditions",
            Intent::CompareTreatments => "compare_treatments",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Search,
    Count,
    Analyze,
    Compare,
}

/// FHIR resource type a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceType {
    Patient,
    Condition,
    MedicationStatement,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Patient => "Patient",
            ResourceType::Condition => "Condition",
            ResourceType::MedicationStatement => "MedicationStatement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeContext {
    Recent,
    PastYear,
    PastMonth,
    Historical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Severe,
    Mild,
    Chronic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Comprehensive,
    Limited,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryModifiers {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_context: Option<TimeContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentResult {
    pub intent: Intent,
    pub confidence: f32,
    pub action: Action,
    pub target_resource: ResourceType,
    pub modifiers: QueryModifiers,
}

// ═══════════════════════════════════════════
// Conditions
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Ner,
    Synonym,
    Semantic,
}

/// A catalog condition matched against the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionMatch {
    pub text: String,
    pub code: String,
    pub system: String,
    pub confidence: f32,
    pub method: MatchMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snomed_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub umls_cui: Option<String>,
}

impl ConditionMatch {
    /// `system|code` token used in FHIR search parameters.
    pub fn token(&self) -> String {
        format!("{}|{}", self.system, self.code)
    }
}

// ═══════════════════════════════════════════
// Attributes
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Pediatric,
    Adolescent,
    Adult,
    Elderly,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Demographics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender_confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<AgeGroup>,
}

impl Demographics {
    pub fn is_empty(&self) -> bool {
        self.gender.is_none() && self.age_group.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemporalFilter {
    pub after_date: NaiveDate,
    pub time_phrase: String,
    pub days_back: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgeFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_age: Option<u32>,
}

impl AgeFilters {
    pub fn is_empty(&self) -> bool {
        self.min_age.is_none() && self.max_age.is_none() && self.exact_age.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NumericConstraints {
    pub age_filters: AgeFilters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

// ═══════════════════════════════════════════
// Report
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingMetadata {
    pub entities_found: usize,
    pub conditions_mapped: usize,
    pub raw_entities_detected: usize,
    pub semantic_confidence: f32,
}

/// Everything the pipeline derived from one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedQuery {
    pub original_query: String,
    pub action: Action,
    pub intent: Intent,
    pub intent_confidence: f32,
    pub modifiers: QueryModifiers,
    pub conditions: Vec<ConditionMatch>,
    pub demographics: Demographics,
    pub age_filters: AgeFilters,
    pub time_filters: Option<TemporalFilter>,
    pub medical_entities: Vec<ExtractedEntity>,
    pub raw_entities: Vec<RawEntity>,
    pub entity_source: EntitySource,
    pub fhir_params: CompiledQuery,
    pub processing_metadata: ProcessingMetadata,
}
