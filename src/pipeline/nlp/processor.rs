use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::conditions::ConditionMapper;
use super::confidence::overall_confidence;
use super::constraints::extract_constraints;
use super::demographics::DemographicsExtractor;
use super::entities::EntityExtractor;
use super::intent::IntentClassifier;
use super::temporal::extract_temporal;
use super::types::{AgeGroup, Gender, Intent, ProcessedQuery, ProcessingMetadata};
use super::QueryError;
use crate::pipeline::catalog::ConceptCatalog;
use crate::pipeline::fhir::compile;
use crate::pipeline::semantic::{EmbeddingModel, EntityRecognizer, SemanticError};

/// Features a showcase query is expected to produce.
#[derive(Debug, Clone, Serialize)]
pub struct ExpectedFeatures {
    pub intent: Intent,
    pub conditions: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<AgeGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal: Option<&'static str>,
    pub complexity: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExampleQuery {
    pub query: &'static str,
    pub description: &'static str,
    pub use_case: &'static str,
    pub expected_features: ExpectedFeatures,
}

/// Runs the full interpretation pipeline for one query.
///
/// Shared across requests behind an `Arc`; every component is read-only
/// after construction.
pub struct QueryProcessor {
    embedder: Arc<dyn EmbeddingModel>,
    catalog: Arc<ConceptCatalog>,
    entities: EntityExtractor,
    intent: IntentClassifier,
    demographics: DemographicsExtractor,
    conditions: ConditionMapper,
}

impl QueryProcessor {
    /// Precomputes intent template and term embeddings.
    pub fn new(
        embedder: Arc<dyn EmbeddingModel>,
        recognizer: Arc<dyn EntityRecognizer>,
        catalog: Arc<ConceptCatalog>,
    ) -> Result<Self, SemanticError> {
        let intent = IntentClassifier::new(embedder.as_ref())?;
        let demographics = DemographicsExtractor::new(embedder.as_ref())?;

        Ok(Self {
            entities: EntityExtractor::new(embedder.clone(), recognizer, catalog.clone()),
            conditions: ConditionMapper::new(catalog.clone()),
            embedder,
            catalog,
            intent,
            demographics,
        })
    }

    pub fn catalog(&self) -> &ConceptCatalog {
        &self.catalog
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    pub fn process(&self, query: &str) -> Result<ProcessedQuery, QueryError> {
        self.process_at(query, Local::now().date_naive())
    }

    /// Process with an explicit reference date for age and time windows.
    pub fn process_at(&self, query: &str, today: NaiveDate) -> Result<ProcessedQuery, QueryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let query_embedding = self.embedder.embed(query)?;

        let extraction = self.entities.extract_detailed(query, &query_embedding)?;
        let intent = self.intent.classify(query, &query_embedding);
        let demographics = self.demographics.extract(query, &query_embedding);
        let temporal = extract_temporal(query, today);
        let constraints = extract_constraints(query);
        let conditions = self
            .conditions
            .map(query, &query_embedding, &extraction.entities);

        let fhir_params = compile(
            &intent,
            &conditions,
            &demographics,
            temporal.as_ref(),
            &constraints,
            today,
        );
        let semantic_confidence = overall_confidence(&intent, &conditions, &demographics);

        tracing::info!(
            intent = intent.intent.as_str(),
            conditions = conditions.len(),
            entities = extraction.entities.len(),
            confidence = semantic_confidence,
            "Query processed"
        );

        Ok(ProcessedQuery {
            original_query: query.to_string(),
            action: intent.action,
            intent: intent.intent,
            intent_confidence: intent.confidence,
            modifiers: intent.modifiers.clone(),
            processing_metadata: ProcessingMetadata {
                entities_found: extraction.entities.len(),
                conditions_mapped: conditions.len(),
                raw_entities_detected: extraction.raw.len(),
                semantic_confidence,
            },
            conditions,
            demographics,
            age_filters: constraints.age_filters,
            time_filters: temporal,
            medical_entities: extraction.entities,
            raw_entities: extraction.raw,
            entity_source: extraction.source,
            fhir_params,
        })
    }

    /// Showcase queries with the features they exercise.
    pub fn example_queries(&self) -> Vec<ExampleQuery> {
        vec![
            ExampleQuery {
                query: "Find patients with myocardial infarction over 65 years old",
                description: "Search for heart attack patients over age 65",
                use_case: "Cardiac care follow-up",
                expected_features: ExpectedFeatures {
                    intent: Intent::SearchPatients,
                    conditions: vec!["myocardial_infarction"],
                    min_age: Some(65),
                    gender: None,
                    age_group: None,
                    temporal: None,
                    complexity: "high",
                },
            },
            ExampleQuery {
                query: "Count elderly women with diabetes and cardiovascular disease",
                description: "Count elderly female patients with diabetes and heart disease",
                use_case: "Population health management",
                expected_features: ExpectedFeatures {
                    intent: Intent::CountPatients,
                    conditions: vec!["diabetes_mellitus", "cardiovascular_disease"],
                    min_age: None,
                    gender: Some(Gender::Female),
                    age_group: Some(AgeGroup::Elderly),
                    temporal: None,
                    complexity: "high",
                },
            },
            ExampleQuery {
                query: "Show me patients diagnosed with lung cancer recently",
                description: "List recently diagnosed lung cancer patients",
                use_case: "Recent diagnosis tracking",
                expected_features: ExpectedFeatures {
                    intent: Intent::SearchPatients,
                    conditions: vec!["lung_cancer"],
                    min_age: None,
                    gender: None,
                    age_group: None,
                    temporal: Some("recently"),
                    complexity: "medium",
                },
            },
            ExampleQuery {
                query: "Analyze depression and anxiety patterns in young adults",
                description: "Study depression and anxiety among young adults",
                use_case: "Mental health research",
                expected_features: ExpectedFeatures {
                    intent: Intent::AnalyzeConditions,
                    conditions: vec!["major_depressive_disorder", "generalized_anxiety_disorder"],
                    min_age: None,
                    gender: None,
                    age_group: Some(AgeGroup::Adolescent),
                    temporal: None,
                    complexity: "high",
                },
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fhir::{SearchValue, SummaryMode};
    use crate::pipeline::nlp::{
        Action, EntitySource, EntityType, MatchMethod, ResourceType, Scope, ICD10_SYSTEM,
    };
    use crate::pipeline::semantic::{LexicalEmbedder, MockRecognizer, NerSpan, NoopRecognizer};

    /// Lexical embedder that refuses one sentinel text.
    struct SentinelEmbedder {
        inner: LexicalEmbedder,
    }

    const UNEMBEDDABLE: &str = "unembeddable sentinel";

    impl EmbeddingModel for SentinelEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
            if text == UNEMBEDDABLE {
                return Err(SemanticError::Connection("http://127.0.0.1:9".into()));
            }
            self.inner.embed(text)
        }
        fn dimension(&self) -> usize {
            self.inner.dimension()
        }
        fn name(&self) -> &str {
            "sentinel"
        }
    }

    const DIABETIC_QUERY: &str = "Show me all diabetic patients over 50";

    /// Lexical embedder that embeds `DIABETIC_QUERY` as diabetes vocabulary,
    /// putting it at about 0.72 cosine from the diabetes concept.
    struct DiabetesLeaningEmbedder {
        inner: LexicalEmbedder,
    }

    impl EmbeddingModel for DiabetesLeaningEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
            if text == DIABETIC_QUERY {
                return self
                    .inner
                    .embed("diabetes mellitus diabetic metabolic glucose insulin DM hyperglycemia");
            }
            self.inner.embed(text)
        }
        fn dimension(&self) -> usize {
            self.inner.dimension()
        }
        fn name(&self) -> &str {
            "diabetes-leaning"
        }
    }

    fn processor_with(recognizer: Arc<dyn EntityRecognizer>) -> QueryProcessor {
        let embedder = Arc::new(LexicalEmbedder::new());
        let catalog = Arc::new(ConceptCatalog::builtin(embedder.as_ref()).unwrap());
        QueryProcessor::new(embedder, recognizer, catalog).unwrap()
    }

    fn processor() -> QueryProcessor {
        processor_with(Arc::new(NoopRecognizer))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn token(code: &str) -> SearchValue {
        SearchValue::from(format!("{ICD10_SYSTEM}|{code}").as_str())
    }

    #[test]
    fn diabetic_patients_over_fifty() {
        let result = processor()
            .process_at("Show me all diabetic patients over 50", today())
            .unwrap();

        let diabetes = result
            .conditions
            .iter()
            .find(|c| c.code == "E11.9")
            .expect("diabetes mapped");
        assert_eq!(diabetes.method, MatchMethod::Synonym);
        assert_eq!(diabetes.text, "diabetic");
        assert!(diabetes.confidence >= 0.9);

        assert_eq!(result.age_filters.min_age, Some(50));
        assert_eq!(result.action, Action::Search);
        assert_eq!(result.intent, Intent::SearchPatients);
        assert_eq!(result.modifiers.scope, Some(Scope::Comprehensive));

        let fhir = &result.fhir_params;
        assert_eq!(fhir.resource_type, ResourceType::Patient);
        assert_eq!(fhir.search_params.get("birthdate"), Some(&SearchValue::from("le1975-12-31")));
        assert_eq!(
            fhir.search_params.get("_has:Condition:patient:code"),
            Some(&token("E11.9"))
        );
        assert_eq!(fhir.count, 100);
        assert_eq!(fhir.summary, None);
    }

    #[test]
    fn count_male_patients_with_depression() {
        let result = processor()
            .process_at("Count male patients with depression", today())
            .unwrap();

        assert_eq!(result.demographics.gender, Some(Gender::Male));
        assert!(result.conditions.iter().any(|c| c.code == "F32.9"));
        assert_eq!(result.action, Action::Count);

        let fhir = &result.fhir_params;
        assert_eq!(fhir.resource_type, ResourceType::Condition);
        assert_eq!(fhir.summary, Some(SummaryMode::Count));
        assert_eq!(fhir.count, 0);
        assert_eq!(fhir.search_params.get("code"), Some(&token("F32.9")));
        assert_eq!(fhir.search_params.get("gender"), Some(&SearchValue::from("male")));
    }

    #[test]
    fn female_patients_with_hypertension_under_65() {
        let result = processor()
            .process_at("Find female patients with hypertension under 65", today())
            .unwrap();

        assert_eq!(result.demographics.gender, Some(Gender::Female));
        let htn = result
            .conditions
            .iter()
            .find(|c| c.code == "I10")
            .expect("hypertension mapped");
        assert_eq!(htn.method, MatchMethod::Synonym);
        assert_eq!(result.age_filters.max_age, Some(65));
        assert_eq!(result.action, Action::Search);

        let fhir = &result.fhir_params;
        assert_eq!(fhir.resource_type, ResourceType::Patient);
        assert_eq!(fhir.search_params.get("birthdate"), Some(&SearchValue::from("ge1960-01-01")));
        assert_eq!(fhir.search_params.get("gender"), Some(&SearchValue::from("female")));
        assert_eq!(fhir.sort, vec!["family", "given"]);
    }

    #[test]
    fn count_ignores_limit_phrase() {
        let result = processor()
            .process_at("Count the first 25 patients with asthma", today())
            .unwrap();
        assert_eq!(result.action, Action::Count);
        assert_eq!(result.fhir_params.summary, Some(SummaryMode::Count));
        assert_eq!(result.fhir_params.count, 0);
    }

    #[test]
    fn temporal_window_on_condition_onset() {
        let result = processor()
            .process_at("Show me patients diagnosed with lung cancer recently", today())
            .unwrap();

        assert!(result.conditions.iter().any(|c| c.code == "C78.00"));
        let window = result.time_filters.as_ref().expect("time window");
        assert_eq!(window.time_phrase, "recently");
        assert_eq!(
            result
                .fhir_params
                .search_params
                .get("_has:Condition:patient:onset-date"),
            Some(&SearchValue::from("ge2025-03-17"))
        );
    }

    #[test]
    fn conditions_sorted_and_confidence_bounded() {
        let p = processor();
        for query in [
            "Count elderly women with diabetes and cardiovascular disease",
            "Analyze depression and anxiety patterns in young adults",
            "xyzzy",
            "Patients with asthma, stroke, MI and diabetes",
        ] {
            let result = p.process_at(query, today()).unwrap();
            for pair in result.conditions.windows(2) {
                assert!(pair[0].confidence >= pair[1].confidence, "{query}");
            }
            let confidence = result.processing_metadata.semantic_confidence;
            assert!((0.1..=1.0).contains(&confidence), "{query}: {confidence}");
            assert!((0.0..=1.0).contains(&result.intent_confidence));
        }
    }

    #[test]
    fn query_is_trimmed() {
        let result = processor()
            .process_at("   Count male patients with depression \n", today())
            .unwrap();
        assert_eq!(result.original_query, "Count male patients with depression");
    }

    #[test]
    fn empty_query_rejected() {
        let p = processor();
        assert!(matches!(p.process_at("", today()), Err(QueryError::EmptyQuery)));
        assert!(matches!(p.process_at("  \t ", today()), Err(QueryError::EmptyQuery)));
    }

    #[test]
    fn query_embedding_failure_is_an_error() {
        let lexical = LexicalEmbedder::new();
        let catalog = Arc::new(ConceptCatalog::builtin(&lexical).unwrap());
        let p = QueryProcessor::new(
            Arc::new(SentinelEmbedder { inner: lexical }),
            Arc::new(NoopRecognizer),
            catalog,
        )
        .unwrap();

        let result = p.process_at(UNEMBEDDABLE, today());
        assert!(matches!(result, Err(QueryError::Embedding(_))));
    }

    #[test]
    fn fallback_entity_keeps_synonym_floor() {
        let embedder = Arc::new(DiabetesLeaningEmbedder {
            inner: LexicalEmbedder::new(),
        });
        let catalog = Arc::new(ConceptCatalog::builtin(embedder.as_ref()).unwrap());
        let p = QueryProcessor::new(embedder, Arc::new(NoopRecognizer), catalog).unwrap();

        let result = p.process_at(DIABETIC_QUERY, today()).unwrap();

        assert_eq!(result.entity_source, EntitySource::SimilarityFallback);
        let entity = result
            .medical_entities
            .iter()
            .find(|e| e.concept_id.as_deref() == Some("diabetes_mellitus"))
            .expect("fallback should tag the diabetes concept");
        assert!(entity.confidence > 0.6 && entity.confidence < 0.9);

        let diabetes: Vec<_> = result
            .conditions
            .iter()
            .filter(|c| c.code == "E11.9")
            .collect();
        assert_eq!(diabetes.len(), 1);
        assert_eq!(diabetes[0].method, MatchMethod::Synonym);
        assert_eq!(diabetes[0].text, "diabetic");
        assert!(diabetes[0].confidence >= 0.9);
    }

    #[test]
    fn ner_entities_reported() {
        let recognizer = MockRecognizer::new(vec![NerSpan {
            text: "metformin".into(),
            label: "Chemical".into(),
            score: 0.93,
            start: 23,
            end: 32,
        }]);
        let result = processor_with(Arc::new(recognizer))
            .process_at("Find diabetic patients metformin users", today())
            .unwrap();

        assert_eq!(result.entity_source, EntitySource::Ner);
        assert_eq!(result.medical_entities.len(), 1);
        assert_eq!(result.medical_entities[0].entity_type, EntityType::Medication);
        assert_eq!(result.raw_entities.len(), 1);
        assert_eq!(result.processing_metadata.entities_found, 1);
        assert_eq!(result.processing_metadata.raw_entities_detected, 1);
        // Non-condition entities don't block catalog mapping.
        assert!(result.conditions.iter().any(|c| c.code == "E11.9"));
    }

    #[test]
    fn metadata_counts_match_report() {
        let result = processor()
            .process_at("Count elderly women with diabetes and cardiovascular disease", today())
            .unwrap();
        assert_eq!(
            result.processing_metadata.conditions_mapped,
            result.conditions.len()
        );
        assert_eq!(
            result.processing_metadata.entities_found,
            result.medical_entities.len()
        );
    }

    #[test]
    fn example_queries_are_listed() {
        let p = processor();
        let examples = p.example_queries();
        assert_eq!(examples.len(), 4);
        assert!(examples.iter().all(|e| !e.description.is_empty()));
        assert_eq!(p.embedder_name(), "lexical");
        assert_eq!(p.catalog().len(), 17);
    }

    #[test]
    fn report_serializes() {
        let result = processor()
            .process_at("Count male patients with depression", today())
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["intent"], "count_patients");
        assert_eq!(json["action"], "count");
        assert_eq!(json["fhir_params"]["resource_type"], "Condition");
        assert_eq!(json["fhir_params"]["summary"], "count");
        assert_eq!(json["demographics"]["gender"], "male");
    }
}
