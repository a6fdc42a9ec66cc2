use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::criterion::{criteria_for_category, Criterion};
use crate::workflows::assessment::domain::{Evaluation, EvaluationId, RiskContext};
use crate::workflows::assessment::scoring::normalize_question;
use crate::workflows::assessment::taxonomy::{
    extract_keywords, risk_keywords, CategoryRuleTable, EvidenceCategory,
};

/// Fewer completed evaluations than this and every detector returns empty
/// collections: insufficient sample is a boundary condition, not an error.
const MIN_SAMPLE: usize = 3;

/// Weaknesses recurring in at least this fraction of evaluations are kept.
const WEAKNESS_FREQUENCY_FLOOR: f64 = 0.30;

/// Mean-score drop between history halves that counts as degradation.
const TEMPORAL_DELTA: f64 = 10.0;

/// A regularity found across two or more evaluations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossEvaluationPattern {
    pub pattern: String,
    pub evaluation_ids: Vec<EvaluationId>,
    pub strength: f64,
    pub implication: String,
    pub risk_relevance: Vec<Criterion>,
}

/// An evaluation whose total score sits more than two population standard
/// deviations from the mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreAnomaly {
    pub evaluation_id: EvaluationId,
    pub title: String,
    pub score: f64,
    pub mean: f64,
    pub deviation: f64,
}

/// Read-only miner over the evaluation history. All detectors are pure and
/// return empty collections below the minimum sample size.
pub struct PatternDetector {
    taxonomy: CategoryRuleTable,
}

impl PatternDetector {
    pub fn new(taxonomy: CategoryRuleTable) -> Self {
        Self { taxonomy }
    }

    /// Recurring weaknesses, temporal trends, and sector patterns combined.
    pub fn detect_patterns(
        &self,
        evaluations: &[Evaluation],
        risk: &RiskContext,
    ) -> Vec<CrossEvaluationPattern> {
        let completed: Vec<&Evaluation> =
            evaluations.iter().filter(|e| e.is_completed()).collect();
        if completed.len() < MIN_SAMPLE {
            return Vec::new();
        }

        let mut patterns = self.find_recurring_weaknesses(&completed, risk);
        patterns.extend(self.detect_temporal_patterns(&completed));
        patterns.extend(self.detect_sector_patterns(&completed));
        patterns
    }

    /// For every (category, normalized question) pair, the fraction of
    /// evaluations answering no. Pairs at or above the frequency floor
    /// survive only when the category's risk vocabulary intersects the
    /// scenario text.
    pub fn find_recurring_weaknesses(
        &self,
        completed: &[&Evaluation],
        risk: &RiskContext,
    ) -> Vec<CrossEvaluationPattern> {
        if completed.len() < MIN_SAMPLE {
            return Vec::new();
        }

        struct Weakness {
            question: String,
            evaluation_ids: Vec<EvaluationId>,
        }

        let mut weaknesses: BTreeMap<(EvidenceCategory, String), Weakness> = BTreeMap::new();
        for evaluation in completed {
            for response in &evaluation.responses {
                if response.value.as_boolean() != Some(false) {
                    continue;
                }
                let category = self.taxonomy.categorize(&response.question_text);
                let key = (category, normalize_question(&response.question_text));
                let entry = weaknesses.entry(key).or_insert_with(|| Weakness {
                    question: response.question_text.clone(),
                    evaluation_ids: Vec::new(),
                });
                if !entry.evaluation_ids.contains(&evaluation.id) {
                    entry.evaluation_ids.push(evaluation.id.clone());
                }
            }
        }

        let context_text = risk.combined_text();
        let context_tokens = extract_keywords(&context_text);

        weaknesses
            .into_iter()
            .filter_map(|((category, _), weakness)| {
                let frequency = weakness.evaluation_ids.len() as f64 / completed.len() as f64;
                if frequency < WEAKNESS_FREQUENCY_FLOOR {
                    return None;
                }
                if !Self::category_matches_context(category, &context_text, &context_tokens) {
                    return None;
                }
                Some(CrossEvaluationPattern {
                    pattern: format!(
                        "Recurring weakness in {}: \"{}\" answered no in {}/{} evaluations",
                        category.label(),
                        weakness.question.trim(),
                        weakness.evaluation_ids.len(),
                        completed.len()
                    ),
                    evaluation_ids: weakness.evaluation_ids,
                    strength: frequency.min(1.0),
                    implication: format!(
                        "The {} control gap persists across the evaluation history and bears directly on this scenario",
                        category.label()
                    ),
                    risk_relevance: criteria_for_category(category).to_vec(),
                })
            })
            .collect()
    }

    fn category_matches_context(
        category: EvidenceCategory,
        context_text: &str,
        context_tokens: &[String],
    ) -> bool {
        risk_keywords(category).iter().any(|keyword| {
            context_text.contains(*keyword)
                || context_tokens.iter().any(|token| token.as_str() == *keyword)
        })
    }

    /// Sort by completion date, halve by count, compare the half means.
    pub fn detect_temporal_patterns(
        &self,
        completed: &[&Evaluation],
    ) -> Vec<CrossEvaluationPattern> {
        if completed.len() < MIN_SAMPLE {
            return Vec::new();
        }

        let mut dated: Vec<&&Evaluation> = completed
            .iter()
            .filter(|e| e.completed_at.is_some() && e.total_score.is_some())
            .collect();
        if dated.len() < MIN_SAMPLE {
            return Vec::new();
        }
        dated.sort_by_key(|e| e.completed_at);

        let midpoint = dated.len() / 2;
        let (first, second) = dated.split_at(midpoint);
        let mean = |half: &[&&Evaluation]| {
            half.iter().filter_map(|e| e.total_score).sum::<f64>() / half.len() as f64
        };
        let first_mean = mean(first);
        let second_mean = mean(second);
        let delta = first_mean - second_mean;

        let mut patterns = Vec::new();
        if delta > TEMPORAL_DELTA {
            patterns.push(CrossEvaluationPattern {
                pattern: format!(
                    "Security posture degradation: mean score fell from {first_mean:.0} to {second_mean:.0} across the evaluation history"
                ),
                evaluation_ids: dated.iter().map(|e| e.id.clone()).collect(),
                strength: (delta / 100.0).clamp(0.0, 1.0),
                implication:
                    "Recent evaluations score materially worse than earlier ones; controls are eroding"
                        .to_string(),
                risk_relevance: vec![Criterion::Probability, Criterion::Vulnerability],
            });
        } else if -delta > TEMPORAL_DELTA {
            patterns.push(CrossEvaluationPattern {
                pattern: format!(
                    "Security posture improvement: mean score rose from {first_mean:.0} to {second_mean:.0} across the evaluation history"
                ),
                evaluation_ids: dated.iter().map(|e| e.id.clone()).collect(),
                strength: ((-delta) / 100.0).clamp(0.0, 1.0),
                implication: "Recent evaluations score materially better than earlier ones"
                    .to_string(),
                risk_relevance: vec![Criterion::Probability],
            });
        }
        patterns
    }

    /// Sectors with at least two evaluations are candidates for sector
    /// pattern extraction. The grouping and candidate selection is the
    /// contract; extraction itself currently yields nothing.
    pub fn detect_sector_patterns(
        &self,
        completed: &[&Evaluation],
    ) -> Vec<CrossEvaluationPattern> {
        let candidates = self.sector_candidates(completed);
        candidates
            .into_iter()
            .flat_map(|(sector, group)| Self::extract_sector_patterns(&sector, &group))
            .collect()
    }

    pub(crate) fn sector_candidates<'a>(
        &self,
        completed: &[&'a Evaluation],
    ) -> Vec<(String, Vec<&'a Evaluation>)> {
        if completed.len() < MIN_SAMPLE {
            return Vec::new();
        }
        let mut groups: BTreeMap<String, Vec<&Evaluation>> = BTreeMap::new();
        for evaluation in completed {
            groups
                .entry(evaluation.sector.trim().to_lowercase())
                .or_default()
                .push(*evaluation);
        }
        groups
            .into_iter()
            .filter(|(_, group)| group.len() >= 2)
            .collect()
    }

    fn extract_sector_patterns(
        _sector: &str,
        _group: &[&Evaluation],
    ) -> Vec<CrossEvaluationPattern> {
        Vec::new()
    }

    /// Flag total scores more than two population standard deviations from
    /// the mean, with explicit titles and scores.
    pub fn detect_anomalies(&self, evaluations: &[Evaluation]) -> Vec<ScoreAnomaly> {
        let scored: Vec<(&Evaluation, f64)> = evaluations
            .iter()
            .filter(|e| e.is_completed())
            .filter_map(|e| e.total_score.map(|score| (e, score)))
            .collect();
        if scored.len() < MIN_SAMPLE {
            return Vec::new();
        }

        let mean = scored.iter().map(|(_, s)| s).sum::<f64>() / scored.len() as f64;
        let variance = scored
            .iter()
            .map(|(_, score)| (score - mean).powi(2))
            .sum::<f64>()
            / scored.len() as f64;
        let stdev = variance.sqrt();
        if stdev == 0.0 {
            return Vec::new();
        }

        scored
            .into_iter()
            .filter(|(_, score)| (score - mean).abs() > 2.0 * stdev)
            .map(|(evaluation, score)| ScoreAnomaly {
                evaluation_id: evaluation.id.clone(),
                title: evaluation.title.clone(),
                score,
                mean,
                deviation: (score - mean).abs() / stdev,
            })
            .collect()
    }
}

impl Default for PatternDetector {
    fn default() -> Self {
        Self::new(CategoryRuleTable::default())
    }
}
