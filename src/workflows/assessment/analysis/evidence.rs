use serde::{Deserialize, Serialize};

use crate::workflows::assessment::domain::{
    Evaluation, EvaluationResponse, ResponseValue, RiskContext,
};
use crate::workflows::assessment::scoring::is_well_formed;
use crate::workflows::assessment::taxonomy::{
    contextual_relevance, extract_keywords, CategoryRuleTable, EvidenceCategory,
};

/// How the source answer was recorded, which drives confidence weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Boolean,
    Percentage,
    Text,
    Score,
}

/// Normalized unit of evidence derived from exactly one questionnaire answer.
///
/// `confidence` and `relevance` are derived here, never stored on the source
/// response. The id is the stable `<evaluation id>:<question id>` composite,
/// so re-running extraction over the same records reproduces the same set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub id: String,
    pub source: String,
    pub category: EvidenceCategory,
    pub response_type: ResponseKind,
    pub question: String,
    pub value: ResponseValue,
    pub confidence: f64,
    pub relevance: f64,
}

impl EvidenceItem {
    /// Citation weight, also the relevance-ranking key.
    pub fn weight(&self) -> f64 {
        self.confidence * self.relevance
    }

    /// One-line rendering used in evidence lists and gateway summaries.
    pub fn summary(&self) -> String {
        format!(
            "{} — {} ({})",
            self.question.trim(),
            self.value.summary(),
            self.source
        )
    }
}

fn response_kind(response: &EvaluationResponse) -> ResponseKind {
    if response.facility_score.is_some() && response.constraint_score.is_some() {
        return ResponseKind::Score;
    }
    match response.value {
        ResponseValue::Boolean(_) => ResponseKind::Boolean,
        ResponseValue::Number(_) => ResponseKind::Percentage,
        ResponseValue::Text(_) => ResponseKind::Text,
    }
}

/// Long or conjunction-heavy questions read less reliably, so their evidence
/// is discounted.
fn complexity_factor(question_text: &str) -> f64 {
    let mut factor: f64 = 1.0;
    if question_text.chars().count() > 120 {
        factor *= 0.9;
    }
    let lowered = question_text.to_lowercase();
    if lowered.contains(" et ") || lowered.contains(" ou ") {
        factor *= 0.95;
    }
    factor
}

/// Confidence per answer shape: structured boolean answers are trusted most,
/// facility+constraint scored answers slightly more, free text least.
pub(crate) fn response_confidence(response: &EvaluationResponse) -> f64 {
    let base = match response_kind(response) {
        ResponseKind::Score => 0.9,
        ResponseKind::Boolean => 0.8,
        ResponseKind::Percentage => 0.7,
        ResponseKind::Text => {
            if matches!(&response.value, ResponseValue::Text(text) if text.trim().chars().count() > 10)
            {
                0.6
            } else {
                0.4
            }
        }
    };
    (base * complexity_factor(&response.question_text)).clamp(0.0, 1.0)
}

/// Relevance of one question to the risk context: direct keyword overlap
/// dominates, the co-occurrence table catches indirect matches, everything
/// else sits at a low floor.
pub(crate) fn response_relevance(context_tokens: &[String], context_text: &str, question_text: &str) -> f64 {
    let question_tokens = extract_keywords(question_text);
    let overlap = question_tokens
        .iter()
        .filter(|token| context_tokens.contains(token))
        .count();

    if overlap > 0 {
        return (0.6 + 0.1 * overlap as f64).min(1.0);
    }

    let paired = contextual_relevance(context_text, question_text);
    if paired > 0.0 {
        paired
    } else {
        0.2
    }
}

/// Weight multiplier applied when averaging evidence quality: fully scored
/// answers count one and a half times.
pub(crate) fn quality_weight(kind: ResponseKind) -> f64 {
    match kind {
        ResponseKind::Score => 1.5,
        _ => 1.0,
    }
}

/// Extract the normalized evidence set for a collection of evaluations.
/// Malformed responses are skipped and contribute nothing.
pub fn extract_evidence(
    evaluations: &[Evaluation],
    risk: &RiskContext,
    taxonomy: &CategoryRuleTable,
) -> Vec<EvidenceItem> {
    let context_text = risk.combined_text();
    let context_tokens = extract_keywords(&context_text);

    let mut items = Vec::new();
    for evaluation in evaluations {
        for response in evaluation.responses.iter().filter(|r| is_well_formed(r)) {
            let kind = response_kind(response);
            items.push(EvidenceItem {
                id: format!("{}:{}", evaluation.id.0, response.question_id),
                source: evaluation.title.clone(),
                category: taxonomy.categorize(&response.question_text),
                response_type: kind,
                question: response.question_text.clone(),
                value: response.value.clone(),
                confidence: response_confidence(response),
                relevance: response_relevance(
                    &context_tokens,
                    &context_text,
                    &response.question_text,
                ),
            });
        }
    }
    items
}
