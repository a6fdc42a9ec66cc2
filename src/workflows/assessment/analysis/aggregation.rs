use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::evidence::{extract_evidence, quality_weight, EvidenceItem};
use crate::workflows::assessment::domain::{Evaluation, RiskContext};
use crate::workflows::assessment::scoring::score_response;
use crate::workflows::assessment::taxonomy::{CategoryRuleTable, EvidenceCategory};

/// Coarse security-maturity reading of the whole evaluation history, used by
/// the impact reasoner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityLevel {
    Low,
    Medium,
    High,
}

impl MaturityLevel {
    fn from_average(average_score: f64, completed: usize) -> Self {
        if completed == 0 || average_score < 40.0 {
            MaturityLevel::Low
        } else if average_score < 70.0 {
            MaturityLevel::Medium
        } else {
            MaturityLevel::High
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            MaturityLevel::Low => "low",
            MaturityLevel::Medium => "medium",
            MaturityLevel::High => "high",
        }
    }
}

/// Immutable aggregate of everything the downstream stages need: statistics,
/// the risk-relevant evidence set, and the evidence-quality reading.
///
/// Built once per analysis run and threaded through the pattern detector and
/// the criterion reasoner; no stage mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub total_evaluations: usize,
    pub completed_evaluations: usize,
    pub average_score: f64,
    pub sector_distribution: BTreeMap<String, usize>,
    pub template_distribution: BTreeMap<String, usize>,
    pub domain_scores: BTreeMap<EvidenceCategory, f64>,
    pub relevant_evidence: Vec<EvidenceItem>,
    pub evidence_quality: f64,
    pub maturity: MaturityLevel,
}

impl AnalysisContext {
    /// Degenerate context for an empty evaluation set: all-zero statistics,
    /// no evidence, zero quality. Never an error.
    pub fn empty() -> Self {
        Self {
            total_evaluations: 0,
            completed_evaluations: 0,
            average_score: 0.0,
            sector_distribution: BTreeMap::new(),
            template_distribution: BTreeMap::new(),
            domain_scores: BTreeMap::new(),
            relevant_evidence: Vec::new(),
            evidence_quality: 0.0,
            maturity: MaturityLevel::Low,
        }
    }
}

/// Combines many evaluations' responses into one `AnalysisContext`.
pub struct CrossEvaluationAggregator {
    taxonomy: CategoryRuleTable,
}

impl CrossEvaluationAggregator {
    pub fn new(taxonomy: CategoryRuleTable) -> Self {
        Self { taxonomy }
    }

    pub fn aggregate(&self, evaluations: &[Evaluation], risk: &RiskContext) -> AnalysisContext {
        if evaluations.is_empty() {
            return AnalysisContext::empty();
        }

        let completed: Vec<&Evaluation> =
            evaluations.iter().filter(|e| e.is_completed()).collect();

        let average_score = if completed.is_empty() {
            0.0
        } else {
            completed
                .iter()
                .filter_map(|e| e.total_score)
                .sum::<f64>()
                / completed.len() as f64
        };

        let mut sector_distribution: BTreeMap<String, usize> = BTreeMap::new();
        let mut template_distribution: BTreeMap<String, usize> = BTreeMap::new();
        for evaluation in evaluations {
            *sector_distribution
                .entry(evaluation.sector.trim().to_lowercase())
                .or_default() += 1;
            *template_distribution
                .entry(evaluation.title.clone())
                .or_default() += 1;
        }

        let domain_scores = self.domain_scores(evaluations);

        let all_evidence = extract_evidence(evaluations, risk, &self.taxonomy);
        let relevant_evidence: Vec<EvidenceItem> = all_evidence
            .into_iter()
            .filter(|item| item.relevance > 0.6)
            .collect();

        let evidence_quality = Self::evidence_quality(&relevant_evidence);
        let maturity = MaturityLevel::from_average(average_score, completed.len());

        AnalysisContext {
            total_evaluations: evaluations.len(),
            completed_evaluations: completed.len(),
            average_score,
            sector_distribution,
            template_distribution,
            domain_scores,
            relevant_evidence,
            evidence_quality,
            maturity,
        }
    }

    /// Mean question score per category across every evaluation.
    fn domain_scores(&self, evaluations: &[Evaluation]) -> BTreeMap<EvidenceCategory, f64> {
        let mut sums: BTreeMap<EvidenceCategory, (f64, usize)> = BTreeMap::new();
        for evaluation in evaluations {
            for response in &evaluation.responses {
                if let Some(score) = score_response(response) {
                    let entry = sums
                        .entry(self.taxonomy.categorize(&response.question_text))
                        .or_insert((0.0, 0));
                    entry.0 += score;
                    entry.1 += 1;
                }
            }
        }
        sums.into_iter()
            .map(|(category, (total, count))| (category, total / count as f64))
            .collect()
    }

    /// Weighted mean of per-item confidence, with fully scored answers
    /// counting one and a half times. Empty input yields 0.
    fn evidence_quality(evidence: &[EvidenceItem]) -> f64 {
        let mut weighted = 0.0;
        let mut weights = 0.0;
        for item in evidence {
            let weight = quality_weight(item.response_type);
            weighted += item.confidence * weight;
            weights += weight;
        }
        if weights == 0.0 {
            0.0
        } else {
            (weighted / weights).clamp(0.0, 1.0)
        }
    }
}

impl Default for CrossEvaluationAggregator {
    fn default() -> Self {
        Self::new(CategoryRuleTable::default())
    }
}
