use super::types::{ConditionMatch, Demographics, IntentResult};

const INTENT_WEIGHT: f32 = 0.3;
const CONDITION_WEIGHT: f32 = 0.5;
const DEMOGRAPHIC_WEIGHT: f32 = 0.2;

/// Demographic confidence used when an age group was found without a gender.
const DEFAULT_DEMOGRAPHIC_CONFIDENCE: f32 = 0.8;

pub const MIN_CONFIDENCE: f32 = 0.1;
pub const MAX_CONFIDENCE: f32 = 1.0;

/// Weighted blend of intent, condition and demographic confidence.
pub fn overall_confidence(
    intent: &IntentResult,
    conditions: &[ConditionMatch],
    demographics: &Demographics,
) -> f32 {
    let mut confidence = intent.confidence * INTENT_WEIGHT;

    if !conditions.is_empty() {
        let mean =
            conditions.iter().map(|c| c.confidence).sum::<f32>() / conditions.len() as f32;
        confidence += mean * CONDITION_WEIGHT;
    }

    if !demographics.is_empty() {
        let demographic = demographics
            .gender_confidence
            .unwrap_or(DEFAULT_DEMOGRAPHIC_CONFIDENCE);
        confidence += demographic * DEMOGRAPHIC_WEIGHT;
    }

    confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
