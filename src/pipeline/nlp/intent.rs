use super::types::{
    Action, Intent, IntentResult, QueryModifiers, ResourceType, Scope, Severity, TimeContext,
};
use crate::pipeline::semantic::{cosine_similarity, EmbeddingModel, SemanticError};

/// Term/query similarity above which a time-context term counts as present.
pub const TIME_CONTEXT_THRESHOLD: f32 = 0.7;

struct IntentDefinition {
    intent: Intent,
    action: Action,
    resource: ResourceType,
    boost: f32,
    templates: &'static [&'static str],
}

static INTENT_DEFINITIONS: &[IntentDefinition] = &[
    IntentDefinition {
        intent: Intent::SearchPatients,
        action: Action::Search,
        resource: ResourceType::Patient,
        boost: 0.10,
        templates: &[
            "Find patients with medical condition",
            "Show me patients diagnosed with disease",
            "List patients having symptoms",
            "Display patients with clinical condition",
            "Get patients with diagnosis",
        ],
    },
    IntentDefinition {
        intent: Intent::CountPatients,
        action: Action::Count,
        resource: ResourceType::Patient,
        boost: 0.15,
        templates: &[
            "Count patients with condition",
            "How many patients have disease",
            "Number of patients diagnosed with",
            "Total patients with medical condition",
            "Enumerate patients having",
        ],
    },
    IntentDefinition {
        intent: Intent::AnalyzeConditions,
        action: Action::Analyze,
        resource: ResourceType::Condition,
        boost: 0.20,
        templates: &[
            "Analyze patient conditions and outcomes",
            "Study disease patterns in population",
            "Examine clinical trends and statistics",
            "Investigate medical condition relationships",
            "Research patient data and correlations",
        ],
    },
    IntentDefinition {
        intent: Intent::CompareTreatments,
        action: Action::Compare,
        resource: ResourceType::MedicationStatement,
        boost: 0.20,
        templates: &[
            "Compare treatment effectiveness",
            "Evaluate therapy outcomes",
            "Analyze medication responses",
            "Study intervention results",
            "Compare clinical approaches",
        ],
    },
];

static TIME_CONTEXT_TERMS: &[(TimeContext, &[&str])] = &[
    (
        TimeContext::Recent,
        &["recently", "latest", "current", "new", "fresh"],
    ),
    (
        TimeContext::PastYear,
        &["last year", "past year", "previous year", "within year"],
    ),
    (
        TimeContext::PastMonth,
        &["last month", "past month", "recent month", "this month"],
    ),
    (
        TimeContext::Historical,
        &["historical", "old", "previous", "former", "past"],
    ),
];

static SEVERITY_TERMS: &[(Severity, &[&str])] = &[
    (
        Severity::Severe,
        &["severe", "critical", "acute", "serious", "grave"],
    ),
    (Severity::Mild, &["mild", "minor", "slight", "light", "moderate"]),
    (
        Severity::Chronic,
        &["chronic", "persistent", "long-term", "ongoing"],
    ),
];

const COMPREHENSIVE_WORDS: &[&str] = &["all", "every", "total", "complete"];
const LIMITED_WORDS: &[&str] = &["some", "few", "several"];

/// Template-similarity intent classifier with modifier extraction.
///
/// Template and time-term embeddings are computed once at construction.
pub struct IntentClassifier {
    template_embeddings: Vec<Vec<Vec<f32>>>,
    time_term_embeddings: Vec<Vec<Vec<f32>>>,
}

impl IntentClassifier {
    pub fn new(embedder: &dyn EmbeddingModel) -> Result<Self, SemanticError> {
        let template_embeddings = INTENT_DEFINITIONS
            .iter()
            .map(|def| embed_all(embedder, def.templates))
            .collect::<Result<Vec<_>, _>>()?;

        let time_term_embeddings = TIME_CONTEXT_TERMS
            .iter()
            .map(|(_, terms)| embed_all(embedder, terms))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            template_embeddings,
            time_term_embeddings,
        })
    }

    pub fn classify(&self, query: &str, query_embedding: &[f32]) -> IntentResult {
        let mut best = &INTENT_DEFINITIONS[0];
        let mut best_score = 0.0f32;

        for (def, templates) in INTENT_DEFINITIONS.iter().zip(&self.template_embeddings) {
            let max_similarity = templates
                .iter()
                .map(|t| cosine_similarity(query_embedding, t))
                .fold(f32::MIN, f32::max);
            let boosted = max_similarity + def.boost;

            if boosted > best_score {
                best_score = boosted;
                best = def;
            }
        }

        tracing::debug!(intent = best.intent.as_str(), score = best_score, "Intent classified");

        IntentResult {
            intent: best.intent,
            confidence: best_score.clamp(0.0, 1.0),
            action: best.action,
            target_resource: best.resource,
            modifiers: self.extract_modifiers(query, query_embedding),
        }
    }

    /// Time-context and severity keep the last matching category; scope
    /// takes the first.
    fn extract_modifiers(&self, query: &str, query_embedding: &[f32]) -> QueryModifiers {
        let lower = query.to_lowercase();
        let mut modifiers = QueryModifiers::default();

        for ((context, terms), embeddings) in
            TIME_CONTEXT_TERMS.iter().zip(&self.time_term_embeddings)
        {
            let hit = terms.iter().zip(embeddings).any(|(term, embedding)| {
                cosine_similarity(query_embedding, embedding) > TIME_CONTEXT_THRESHOLD
                    || lower.contains(term)
            });
            if hit {
                modifiers.time_context = Some(*context);
            }
        }

        for (severity, terms) in SEVERITY_TERMS {
            if terms.iter().any(|term| lower.contains(term)) {
                modifiers.severity = Some(*severity);
            }
        }

        if COMPREHENSIVE_WORDS.iter().any(|w| lower.contains(w)) {
            modifiers.scope = Some(Scope::Comprehensive);
        } else if LIMITED_WORDS.iter().any(|w| lower.contains(w)) {
            modifiers.scope = Some(Scope::Limited);
        }

        modifiers
    }
}

fn embed_all(embedder: &dyn EmbeddingModel, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
    texts.iter().map(|t| embedder.embed(t)).collect()
}
