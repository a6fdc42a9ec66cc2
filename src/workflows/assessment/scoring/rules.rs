use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::ScoringConfig;
use crate::workflows::assessment::domain::{EvaluationResponse, ResponseValue};
use crate::workflows::assessment::taxonomy::{
    criticality, CategoryRuleTable, Criticality, EvidenceCategory,
};

/// Per-category rollup recomputed on demand, never persisted.
///
/// `score` is the facility-minus-constraint net; `mean_score` (0-100) is what
/// feeds the weighted total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: EvidenceCategory,
    pub facility_score: f64,
    pub constraint_score: f64,
    pub score: f64,
    pub mean_score: f64,
    pub completion_rate: f64,
    pub critical_issues: Vec<String>,
}

/// A response is usable when its optional 1-3 scores are in range. Malformed
/// responses are skipped, never aborting the evaluation.
pub(crate) fn is_well_formed(response: &EvaluationResponse) -> bool {
    let in_band = |score: Option<u8>| score.map_or(true, |v| (1..=3).contains(&v));
    !response.question_id.is_empty()
        && in_band(response.facility_score)
        && in_band(response.constraint_score)
}

/// 0-100 score for one question, `None` when the answer carries no score.
///
/// Boolean yes starts at 100, no at 0. A facility score lifts a positive
/// answer by 10 per point above 1; a constraint score costs 5 per point.
/// Numeric answers are read as percentages. Free text is unscored.
pub(crate) fn score_response(response: &EvaluationResponse) -> Option<f64> {
    match &response.value {
        ResponseValue::Boolean(answer) => {
            let mut score: f64 = if *answer { 100.0 } else { 0.0 };
            if *answer {
                if let Some(facility) = response.facility_score {
                    score += 10.0 * f64::from(facility.saturating_sub(1));
                }
            }
            if let Some(constraint) = response.constraint_score {
                score -= 5.0 * f64::from(constraint);
            }
            Some(score.clamp(0.0, 100.0))
        }
        ResponseValue::Number(value) => Some(value.clamp(0.0, 100.0)),
        ResponseValue::Text(_) => None,
    }
}

/// A text answer counts as answered once it carries content; scored answers
/// always do.
fn is_answered(response: &EvaluationResponse) -> bool {
    match &response.value {
        ResponseValue::Text(text) => !text.trim().is_empty(),
        _ => true,
    }
}

/// Whitespace-collapsed lowercase form used to group identical questions.
pub(crate) fn normalize_question(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn critical_issue(
    response: &EvaluationResponse,
    category: EvidenceCategory,
    config: &ScoringConfig,
) -> Option<String> {
    let question = response.question_text.to_lowercase();
    if response.value.as_boolean() == Some(false)
        && config
            .critical_keywords
            .iter()
            .any(|keyword| question.contains(keyword.as_str()))
    {
        return Some(format!(
            "{} (critical control absent)",
            response.question_text.trim()
        ));
    }

    if response.constraint_score >= Some(3) && criticality(category) == Criticality::Critical {
        return Some(format!(
            "{} (severe constraint in critical category)",
            response.question_text.trim()
        ));
    }

    None
}

/// Group responses by category and roll each group up. Categories with zero
/// scored questions are excluded rather than scored as 0.
pub(crate) fn rollup_categories(
    responses: &[EvaluationResponse],
    taxonomy: &CategoryRuleTable,
    config: &ScoringConfig,
) -> BTreeMap<EvidenceCategory, CategoryScore> {
    struct Accumulator {
        scores: Vec<f64>,
        facility: f64,
        constraint: f64,
        answered: usize,
        total: usize,
        critical_issues: Vec<String>,
    }

    let mut groups: BTreeMap<EvidenceCategory, Accumulator> = BTreeMap::new();

    for response in responses.iter().filter(|r| is_well_formed(r)) {
        let category = taxonomy.categorize(&response.question_text);
        let entry = groups.entry(category).or_insert_with(|| Accumulator {
            scores: Vec::new(),
            facility: 0.0,
            constraint: 0.0,
            answered: 0,
            total: 0,
            critical_issues: Vec::new(),
        });

        entry.total += 1;
        if is_answered(response) {
            entry.answered += 1;
        }
        if let Some(score) = score_response(response) {
            entry.scores.push(score);
        }
        if let Some(facility) = response.facility_score {
            entry.facility += f64::from(facility);
        }
        if let Some(constraint) = response.constraint_score {
            entry.constraint += f64::from(constraint);
        }
        if let Some(issue) = critical_issue(response, category, config) {
            entry.critical_issues.push(issue);
        }
    }

    groups
        .into_iter()
        .filter(|(_, acc)| !acc.scores.is_empty())
        .map(|(category, acc)| {
            let mean_score = acc.scores.iter().sum::<f64>() / acc.scores.len() as f64;
            let completion_rate = if acc.total == 0 {
                0.0
            } else {
                acc.answered as f64 / acc.total as f64
            };
            (
                category,
                CategoryScore {
                    category,
                    facility_score: acc.facility,
                    constraint_score: acc.constraint,
                    score: acc.facility - acc.constraint,
                    mean_score,
                    completion_rate,
                    critical_issues: acc.critical_issues,
                },
            )
        })
        .collect()
}

/// Weighted total over the categories actually present. Absent categories'
/// weights are not redistributed: missing sections lower the total instead of
/// being compensated away.
pub(crate) fn weighted_total(
    sections: &BTreeMap<EvidenceCategory, CategoryScore>,
    weights: &BTreeMap<EvidenceCategory, f64>,
) -> f64 {
    sections
        .iter()
        .map(|(category, section)| {
            section.mean_score * weights.get(category).copied().unwrap_or(0.0)
        })
        .sum()
}
