use chrono::{Datelike, NaiveDate};

use super::types::{CompiledQuery, SearchParams, SummaryMode};
use crate::pipeline::nlp::{
    Action, ConditionMatch, Demographics, IntentResult, NumericConstraints, ResourceType, Scope,
    TemporalFilter,
};

pub const PARAM_GENDER: &str = "gender";
pub const PARAM_BIRTHDATE: &str = "birthdate";
pub const PARAM_CODE: &str = "code";
pub const PARAM_CONDITION_CODE: &str = "_has:Condition:patient:code";
pub const PARAM_CONDITION_ONSET: &str = "_has:Condition:patient:onset-date";
pub const PARAM_LAST_UPDATED: &str = "_lastUpdated";

pub const DEFAULT_COUNT: u32 = 20;
pub const COMPREHENSIVE_COUNT: u32 = 100;
pub const LIMITED_COUNT: u32 = 10;

/// Assemble the FHIR search for one interpreted query.
///
/// Age bounds become birth-year ranges relative to `today`'s year. A count
/// action always compiles to `_summary=count` with a zero page size; with
/// conditions it also switches to a `Condition` search on `code`.
pub fn compile(
    intent: &IntentResult,
    conditions: &[ConditionMatch],
    demographics: &Demographics,
    temporal: Option<&TemporalFilter>,
    constraints: &NumericConstraints,
    today: NaiveDate,
) -> CompiledQuery {
    let mut resource_type = intent.target_resource;
    let mut params = SearchParams::new();
    let is_count = intent.action == Action::Count;

    if let Some(gender) = demographics.gender {
        params.set(PARAM_GENDER, gender.as_str());
    }

    let year = i64::from(today.year());
    let ages = &constraints.age_filters;

    if let Some(min_age) = ages.min_age {
        params.set(PARAM_BIRTHDATE, format!("le{}-12-31", year - i64::from(min_age)));
    }

    if let Some(max_age) = ages.max_age {
        let lower = format!("ge{}-01-01", year - i64::from(max_age));
        let existing: Option<Vec<String>> = params
            .get(PARAM_BIRTHDATE)
            .map(|v| v.values().into_iter().map(String::from).collect());

        match existing {
            Some(mut values) => {
                values.push(lower);
                params.set(PARAM_BIRTHDATE, values);
            }
            None => params.set(PARAM_BIRTHDATE, lower),
        }
    }

    if let Some(exact_age) = ages.exact_age {
        let birth_year = year - i64::from(exact_age);
        params.set(
            PARAM_BIRTHDATE,
            vec![
                format!("ge{birth_year}-01-01"),
                format!("le{birth_year}-12-31"),
            ],
        );
    }

    if !conditions.is_empty() {
        let tokens = conditions
            .iter()
            .map(ConditionMatch::token)
            .collect::<Vec<_>>()
            .join(",");

        if is_count {
            resource_type = ResourceType::Condition;
            params.set(PARAM_CODE, tokens);
        } else {
            params.set(PARAM_CONDITION_CODE, tokens);
        }
    }

    if let Some(temporal) = temporal {
        let cutoff = format!("ge{}", temporal.after_date.format("%Y-%m-%d"));
        if conditions.is_empty() {
            params.set(PARAM_LAST_UPDATED, cutoff);
        } else {
            params.set(PARAM_CONDITION_ONSET, cutoff);
        }
    }

    let (count, summary) = if is_count {
        (0, Some(SummaryMode::Count))
    } else {
        let count = match (constraints.max_results, intent.modifiers.scope) {
            (Some(limit), _) => limit,
            (None, Some(Scope::Comprehensive)) => COMPREHENSIVE_COUNT,
            (None, Some(Scope::Limited)) => LIMITED_COUNT,
            (None, None) => DEFAULT_COUNT,
        };
        (count, None)
    };

    let sort = match resource_type {
        ResourceType::Patient => vec!["family".to_string(), "given".to_string()],
        ResourceType::Condition => vec!["-recorded-date".to_string()],
        ResourceType::MedicationStatement => Vec::new(),
    };

    CompiledQuery {
        resource_type,
        search_params: params,
        include: Vec::new(),
        sort,
        count,
        summary,
    }
}
