//! Built-in condition ontology.
//!
//! Seventeen common chronic and acute conditions with ICD-10-CM, SNOMED CT and
//! UMLS codes. Synonym order matters: the condition mapper reports the first
//! synonym found in a query.

use super::loader::ConceptSpec;

pub(crate) struct BuiltinConcept {
    pub name: &'static str,
    pub icd10: &'static str,
    pub snomed: &'static str,
    pub umls: &'static str,
    pub category: &'static str,
    pub synonyms: &'static [&'static str],
    pub description: &'static str,
}

pub(crate) static BUILTIN_CONCEPTS: &[BuiltinConcept] = &[
    // Endocrine
    BuiltinConcept {
        name: "diabetes_mellitus",
        icd10: "E11.9",
        snomed: "44054006",
        umls: "C0011860",
        category: "endocrine",
        synonyms: &[
            "diabetes",
            "diabetic",
            "DM",
            "diabetes mellitus",
            "hyperglycemia",
            "insulin resistance",
            "type 2 diabetes",
            "NIDDM",
            "adult onset diabetes",
        ],
        description: "diabetes mellitus metabolic disorder glucose insulin",
    },
    BuiltinConcept {
        name: "diabetic_ketoacidosis",
        icd10: "E10.10",
        snomed: "420422005",
        umls: "C0011880",
        category: "endocrine",
        synonyms: &["DKA", "ketoacidosis", "diabetic coma"],
        description: "diabetic ketoacidosis emergency hyperglycemia ketones",
    },
    // Cardiovascular
    BuiltinConcept {
        name: "hypertension",
        icd10: "I10",
        snomed: "38341003",
        umls: "C0020538",
        category: "cardiovascular",
        synonyms: &[
            "high blood pressure",
            "HTN",
            "hypertensive",
            "elevated BP",
            "arterial hypertension",
            "essential hypertension",
        ],
        description: "hypertension high blood pressure cardiovascular systolic diastolic",
    },
    BuiltinConcept {
        name: "myocardial_infarction",
        icd10: "I21.9",
        snomed: "22298006",
        umls: "C0027051",
        category: "cardiovascular",
        synonyms: &[
            "myocardial infarction",
            "heart attack",
            "MI",
            "myocardial infarct",
            "cardiac infarction",
            "coronary thrombosis",
            "heart failure acute",
            "acute MI",
            "STEMI",
            "NSTEMI",
        ],
        description: "myocardial infarction heart attack cardiac emergency coronary MI",
    },
    BuiltinConcept {
        name: "atrial_fibrillation",
        icd10: "I48.91",
        snomed: "49436004",
        umls: "C0004238",
        category: "cardiovascular",
        synonyms: &["AFib", "A-fib", "atrial fib", "irregular heartbeat", "arrhythmia"],
        description: "atrial fibrillation arrhythmia irregular heart rhythm cardiac",
    },
    BuiltinConcept {
        name: "cardiovascular_disease",
        icd10: "I25.10",
        snomed: "49601007",
        umls: "C0007222",
        category: "cardiovascular",
        synonyms: &[
            "cardiovascular disease",
            "heart disease",
            "cardiac disease",
            "CVD",
            "coronary artery disease",
            "CAD",
            "coronary heart disease",
            "CHD",
            "ischemic heart disease",
            "IHD",
            "cardiac condition",
            "heart condition",
        ],
        description: "cardiovascular disease heart cardiac coronary artery atherosclerosis",
    },
    // Respiratory
    BuiltinConcept {
        name: "chronic_obstructive_pulmonary_disease",
        icd10: "J44.1",
        snomed: "13645005",
        umls: "C0024117",
        category: "respiratory",
        synonyms: &[
            "COPD",
            "emphysema",
            "chronic bronchitis",
            "obstructive lung disease",
            "respiratory failure chronic",
        ],
        description: "COPD chronic obstructive pulmonary disease emphysema bronchitis",
    },
    BuiltinConcept {
        name: "asthma",
        icd10: "J45.9",
        snomed: "195967001",
        umls: "C0004096",
        category: "respiratory",
        synonyms: &[
            "bronchial asthma",
            "allergic asthma",
            "exercise induced asthma",
            "wheezing",
            "bronchospasm",
        ],
        description: "asthma bronchial allergic respiratory wheezing bronchospasm",
    },
    BuiltinConcept {
        name: "pneumonia",
        icd10: "J15.9",
        snomed: "233604007",
        umls: "C0032285",
        category: "respiratory",
        synonyms: &[
            "lung infection",
            "pneumonitis",
            "bacterial pneumonia",
            "viral pneumonia",
            "respiratory infection",
        ],
        description: "pneumonia lung infection respiratory bacterial viral",
    },
    // Mental health
    BuiltinConcept {
        name: "major_depressive_disorder",
        icd10: "F32.9",
        snomed: "370143000",
        umls: "C1269683",
        category: "mental_health",
        synonyms: &[
            "depression",
            "major depression",
            "MDD",
            "depressive episode",
            "clinical depression",
            "unipolar depression",
        ],
        description: "depression major depressive disorder mental health mood",
    },
    BuiltinConcept {
        name: "generalized_anxiety_disorder",
        icd10: "F41.1",
        snomed: "21897009",
        umls: "C0270549",
        category: "mental_health",
        synonyms: &[
            "anxiety",
            "GAD",
            "anxiety disorder",
            "generalized anxiety",
            "panic disorder",
            "social anxiety",
        ],
        description: "anxiety generalized anxiety disorder mental health panic",
    },
    // Musculoskeletal
    BuiltinConcept {
        name: "rheumatoid_arthritis",
        icd10: "M06.9",
        snomed: "69896004",
        umls: "C0003873",
        category: "musculoskeletal",
        synonyms: &[
            "RA",
            "rheumatoid",
            "arthritis",
            "joint inflammation",
            "autoimmune arthritis",
            "inflammatory arthritis",
        ],
        description: "rheumatoid arthritis autoimmune joint inflammation",
    },
    BuiltinConcept {
        name: "osteoarthritis",
        icd10: "M19.9",
        snomed: "396275006",
        umls: "C0029408",
        category: "musculoskeletal",
        synonyms: &[
            "OA",
            "degenerative arthritis",
            "joint degeneration",
            "wear and tear arthritis",
        ],
        description: "osteoarthritis degenerative joint disease wear tear",
    },
    // Oncology
    BuiltinConcept {
        name: "lung_cancer",
        icd10: "C78.00",
        snomed: "363358000",
        umls: "C0242379",
        category: "oncology",
        synonyms: &[
            "lung cancer",
            "lung carcinoma",
            "bronchogenic carcinoma",
            "pulmonary cancer",
            "lung tumor",
            "lung neoplasm",
            "cancer of the lung",
            "lung malignancy",
        ],
        description: "lung cancer carcinoma bronchogenic pulmonary neoplasm",
    },
    BuiltinConcept {
        name: "breast_cancer",
        icd10: "C50.9",
        snomed: "254837009",
        umls: "C0006142",
        category: "oncology",
        synonyms: &[
            "breast carcinoma",
            "mammary cancer",
            "breast tumor",
            "breast neoplasm",
            "mammary carcinoma",
        ],
        description: "breast cancer carcinoma mammary neoplasm tumor",
    },
    // Neurological
    BuiltinConcept {
        name: "stroke",
        icd10: "I64",
        snomed: "230690007",
        umls: "C0038454",
        category: "neurological",
        synonyms: &[
            "cerebrovascular accident",
            "CVA",
            "brain attack",
            "cerebral infarction",
            "hemorrhagic stroke",
            "ischemic stroke",
        ],
        description: "stroke cerebrovascular accident brain CVA neurological",
    },
    BuiltinConcept {
        name: "alzheimer_disease",
        icd10: "G30.9",
        snomed: "26929004",
        umls: "C0002395",
        category: "neurological",
        synonyms: &[
            "Alzheimer's",
            "dementia",
            "cognitive decline",
            "memory loss",
            "neurodegenerative disease",
        ],
        description: "Alzheimer disease dementia cognitive decline memory neurodegenerative",
    },
];

impl From<&BuiltinConcept> for ConceptSpec {
    fn from(b: &BuiltinConcept) -> Self {
        ConceptSpec {
            name: b.name.to_string(),
            icd10: b.icd10.to_string(),
            snomed: Some(b.snomed.to_string()),
            umls: Some(b.umls.to_string()),
            category: b.category.to_string(),
            synonyms: b.synonyms.iter().map(|s| s.to_string()).collect(),
            description: b.description.to_string(),
        }
    }
}

/// The built-in ontology as concept definitions, in declaration order.
pub fn builtin_specs() -> Vec<ConceptSpec> {
    BUILTIN_CONCEPTS.iter().map(ConceptSpec::from).collect()
}
