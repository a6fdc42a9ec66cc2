use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::criterion::Criterion;
use super::evidence::{extract_evidence, EvidenceItem};
use crate::workflows::assessment::domain::{Evaluation, RiskContext};
use crate::workflows::assessment::taxonomy::CategoryRuleTable;

/// Polarity of a citation: does the evidence support, oppose, or merely
/// inform the conclusion it is attached to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SupportType {
    Positive,
    Negative,
    Neutral,
}

/// Typed link between one evidence item and one criterion conclusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub evidence_id: String,
    pub criterion: Criterion,
    pub support_type: SupportType,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Outcome of `CitationTracker::validate`: a first-class, testable report,
/// not a log side-effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationReport {
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Accumulates evidence-to-conclusion links over a single analysis run.
///
/// The only stateful component in the pipeline; each run owns its own
/// instance, so no state crosses concurrent analyses.
#[derive(Debug, Default)]
pub struct CitationTracker {
    evidence: BTreeMap<String, EvidenceItem>,
    citations: Vec<Citation>,
    by_criterion: BTreeMap<Criterion, BTreeMap<SupportType, Vec<usize>>>,
}

impl CitationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the evidence set from the raw evaluations using the same
    /// normalization rules as the aggregator.
    pub fn add_evidence_from_evaluations(
        &mut self,
        evaluations: &[Evaluation],
        risk: &RiskContext,
        taxonomy: &CategoryRuleTable,
    ) {
        for item in extract_evidence(evaluations, risk, taxonomy) {
            self.evidence.insert(item.id.clone(), item);
        }
    }

    pub fn evidence(&self, id: &str) -> Option<&EvidenceItem> {
        self.evidence.get(id)
    }

    pub fn evidence_count(&self) -> usize {
        self.evidence.len()
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Link one evidence item to a criterion. Unknown evidence ids fail
    /// silently: data-quality problems surface through `validate`, never as
    /// errors mid-analysis.
    pub fn create_citation(
        &mut self,
        evidence_id: &str,
        criterion: Criterion,
        support_type: SupportType,
        context: Option<String>,
    ) -> Option<&Citation> {
        let item = self.evidence.get(evidence_id)?;
        let citation = Citation {
            evidence_id: evidence_id.to_string(),
            criterion,
            support_type,
            weight: item.weight(),
            context,
        };
        let index = self.citations.len();
        self.citations.push(citation);
        self.by_criterion
            .entry(criterion)
            .or_default()
            .entry(support_type)
            .or_default()
            .push(index);
        self.citations.last()
    }

    /// Evidence sorted by confidence x relevance descending, truncated.
    /// Ties break on id so the ordering is reproducible.
    pub fn find_relevant_evidence(&self, _criterion: Criterion, limit: usize) -> Vec<&EvidenceItem> {
        let mut ranked: Vec<&EvidenceItem> = self.evidence.values().collect();
        ranked.sort_by(|a, b| {
            b.weight()
                .partial_cmp(&a.weight())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Citations filed for one criterion with a given polarity.
    pub fn citations_for(&self, criterion: Criterion, support_type: SupportType) -> Vec<&Citation> {
        self.by_criterion
            .get(&criterion)
            .and_then(|by_type| by_type.get(&support_type))
            .map(|indexes| indexes.iter().map(|i| &self.citations[*i]).collect())
            .unwrap_or_default()
    }

    /// Completeness and quality audit over everything cited so far.
    ///
    /// Valid iff every criterion holds at least one citation and at least one
    /// of them is non-neutral. A global alarm fires when more than half of
    /// all citations weigh under 0.3.
    pub fn validate(&self) -> CitationReport {
        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        for criterion in Criterion::ALL {
            let by_type = self.by_criterion.get(&criterion);
            let total: usize = by_type
                .map(|map| map.values().map(Vec::len).sum())
                .unwrap_or(0);

            if total == 0 {
                issues.push(format!(
                    "criterion '{}' has no supporting citations",
                    criterion.label()
                ));
                recommendations.push(format!(
                    "Collect evaluation responses relevant to {} so its conclusion can be traced to evidence",
                    criterion.label()
                ));
                continue;
            }

            let neutral = by_type
                .and_then(|map| map.get(&SupportType::Neutral))
                .map(Vec::len)
                .unwrap_or(0);
            if neutral == total {
                issues.push(format!(
                    "criterion '{}' is backed only by neutral citations",
                    criterion.label()
                ));
                recommendations.push(format!(
                    "Review the {} evidence: only neutral observations were found, so the score rests on the base value",
                    criterion.label()
                ));
            }
        }

        if !self.citations.is_empty() {
            let weak = self
                .citations
                .iter()
                .filter(|citation| citation.weight < 0.3)
                .count();
            if weak * 2 > self.citations.len() {
                issues.push(format!(
                    "{weak} of {} citations carry a weight below 0.3",
                    self.citations.len()
                ));
                recommendations.push(
                    "Most citations are low-confidence or weakly relevant; prefer questionnaires with scored answers and align the risk context with the evaluated domains"
                        .to_string(),
                );
            }
        }

        let has_zero_or_neutral_only = issues
            .iter()
            .any(|issue| issue.contains("no supporting") || issue.contains("only by neutral"));

        CitationReport {
            is_valid: !has_zero_or_neutral_only,
            issues,
            recommendations,
        }
    }
}
