use serde::{Deserialize, Serialize};

use super::aggregation::{AnalysisContext, MaturityLevel};
use super::citations::{CitationTracker, SupportType};
use super::criterion::{
    sector_impact_multiplier, Criterion, CriterionProfile, HIGH_SEVERITY_KEYWORDS,
    MEDIUM_SEVERITY_KEYWORDS,
};
use super::evidence::EvidenceItem;
use super::patterns::CrossEvaluationPattern;
use crate::workflows::assessment::domain::{ResponseValue, RiskContext};

/// Placeholder strings used when one evidence polarity is empty. Callers must
/// never have to infer "no evidence" from an empty list alone.
pub const NO_POSITIVE_EVIDENCE: &str =
    "No supporting evidence found in the available evaluations";
pub const NO_NEGATIVE_EVIDENCE: &str =
    "No opposing evidence found in the available evaluations";

/// Weight applied to a pattern's strength when it adjusts a criterion score.
const PATTERN_WEIGHT: f64 = 0.5;

/// A named influence on a criterion score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualFactor {
    pub factor: String,
    pub impact: SupportType,
    pub magnitude: f64,
    pub explanation: String,
    pub evidence_ids: Vec<String>,
}

/// Scored conclusion for one criterion, with the evidence trail that
/// produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionAssessment {
    pub criterion: Criterion,
    pub score: u8,
    pub explanation: String,
    pub positive_evidence: Vec<String>,
    pub negative_evidence: Vec<String>,
    pub contextual_factors: Vec<ContextualFactor>,
    pub confidence: f64,
    pub reasoning: String,
}

/// Deterministic criterion scorer. All three criteria share this shape; only
/// the profile tables differ.
pub struct CriterionReasoner;

impl CriterionReasoner {
    /// Score one criterion from the aggregated context, filing citations for
    /// every evidence item considered.
    pub fn assess(
        criterion: Criterion,
        context: &AnalysisContext,
        patterns: &[CrossEvaluationPattern],
        risk: &RiskContext,
        tracker: &mut CitationTracker,
    ) -> CriterionAssessment {
        let profile = CriterionProfile::for_criterion(criterion);
        let mut score = profile.base;
        let mut positive_evidence = Vec::new();
        let mut negative_evidence = Vec::new();
        let mut contextual_factors = Vec::new();
        let mut considered = 0usize;

        for item in context
            .relevant_evidence
            .iter()
            .filter(|item| Self::matches_profile(item, &profile))
        {
            considered += 1;
            match &item.value {
                ResponseValue::Boolean(false) => {
                    score += profile.step;
                    negative_evidence.push(item.summary());
                    tracker.create_citation(
                        &item.id,
                        criterion,
                        SupportType::Negative,
                        Some("control absent".to_string()),
                    );
                }
                ResponseValue::Boolean(true) => {
                    score -= profile.step;
                    positive_evidence.push(item.summary());
                    tracker.create_citation(
                        &item.id,
                        criterion,
                        SupportType::Positive,
                        Some("control in place".to_string()),
                    );
                }
                ResponseValue::Number(value) => {
                    if *value < profile.low_threshold {
                        score += profile.step * (profile.low_threshold - value)
                            / profile.low_threshold;
                        negative_evidence.push(item.summary());
                        tracker.create_citation(
                            &item.id,
                            criterion,
                            SupportType::Negative,
                            Some(format!("coverage below {:.0}%", profile.low_threshold)),
                        );
                    } else if *value > profile.high_threshold {
                        score -= profile.step * (value - profile.high_threshold)
                            / (100.0 - profile.high_threshold);
                        positive_evidence.push(item.summary());
                        tracker.create_citation(
                            &item.id,
                            criterion,
                            SupportType::Positive,
                            Some(format!("coverage above {:.0}%", profile.high_threshold)),
                        );
                    } else {
                        tracker.create_citation(
                            &item.id,
                            criterion,
                            SupportType::Neutral,
                            Some("mid-range coverage".to_string()),
                        );
                    }
                }
                ResponseValue::Text(_) => {
                    tracker.create_citation(
                        &item.id,
                        criterion,
                        SupportType::Neutral,
                        Some("narrative answer".to_string()),
                    );
                }
            }
        }

        let mut applied_patterns = 0usize;
        for pattern in patterns
            .iter()
            .filter(|pattern| pattern.risk_relevance.contains(&criterion))
        {
            applied_patterns += 1;
            score += pattern.strength * PATTERN_WEIGHT;
            negative_evidence.push(pattern.pattern.clone());
            contextual_factors.push(ContextualFactor {
                factor: "cross-evaluation pattern".to_string(),
                impact: SupportType::Negative,
                magnitude: pattern.strength,
                explanation: pattern.implication.clone(),
                evidence_ids: pattern
                    .evaluation_ids
                    .iter()
                    .map(|id| id.0.clone())
                    .collect(),
            });
        }

        if criterion == Criterion::Impact {
            score = Self::apply_impact_modifiers(score, context, risk, &mut contextual_factors);
        }

        let final_score = profile.clamp_score(score);
        let confidence = Self::confidence(criterion, context, considered, tracker);

        if positive_evidence.is_empty() {
            positive_evidence.push(NO_POSITIVE_EVIDENCE.to_string());
        }
        if negative_evidence.is_empty() {
            negative_evidence.push(NO_NEGATIVE_EVIDENCE.to_string());
        }

        let explanation = format!(
            "{} assessed at {}/{} from {} relevant evidence item(s) across {} evaluation(s)",
            capitalize(criterion.label()),
            final_score,
            profile.max,
            considered,
            context.total_evaluations
        );
        let reasoning = format!(
            "Started at base {:.1}; {} evidence item(s) adjusted the raw score to {:.2}; {} applicable pattern(s); clamped into {}-{}",
            profile.base, considered, score, applied_patterns, profile.min, profile.max
        );

        CriterionAssessment {
            criterion,
            score: final_score,
            explanation,
            positive_evidence,
            negative_evidence,
            contextual_factors,
            confidence,
            reasoning,
        }
    }

    fn matches_profile(item: &EvidenceItem, profile: &CriterionProfile) -> bool {
        let question = item.question.to_lowercase();
        profile
            .keywords
            .iter()
            .any(|keyword| question.contains(*keyword))
    }

    /// Impact-only modifiers: sector multiplier, maturity adjustment, and the
    /// scenario severity keyword scan.
    fn apply_impact_modifiers(
        mut score: f64,
        context: &AnalysisContext,
        risk: &RiskContext,
        contextual_factors: &mut Vec<ContextualFactor>,
    ) -> f64 {
        let sector = context
            .sector_distribution
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(sector, _)| sector.as_str())
            .unwrap_or("");
        let multiplier = sector_impact_multiplier(sector);
        if (multiplier - 1.0).abs() > f64::EPSILON {
            score *= multiplier;
            contextual_factors.push(ContextualFactor {
                factor: format!("sector impact multiplier ({sector})"),
                impact: if multiplier > 1.0 {
                    SupportType::Negative
                } else {
                    SupportType::Positive
                },
                magnitude: (multiplier - 1.0).abs().min(1.0),
                explanation: format!(
                    "Sector '{sector}' weighs impact by a factor of {multiplier:.1}"
                ),
                evidence_ids: Vec::new(),
            });
        }

        let maturity_adjustment = match context.maturity {
            MaturityLevel::Low => 0.5,
            MaturityLevel::Medium => 0.0,
            MaturityLevel::High => -0.3,
        };
        if maturity_adjustment != 0.0 {
            score += maturity_adjustment;
            contextual_factors.push(ContextualFactor {
                factor: "security maturity".to_string(),
                impact: if maturity_adjustment > 0.0 {
                    SupportType::Negative
                } else {
                    SupportType::Positive
                },
                magnitude: maturity_adjustment.abs(),
                explanation: format!(
                    "Organizational maturity is {}, which shifts the expected impact",
                    context.maturity.label()
                ),
                evidence_ids: Vec::new(),
            });
        }

        let scenario = risk.combined_text();
        let high_hits = HIGH_SEVERITY_KEYWORDS
            .iter()
            .filter(|keyword| scenario.contains(*keyword))
            .count();
        let medium_hits = MEDIUM_SEVERITY_KEYWORDS
            .iter()
            .filter(|keyword| scenario.contains(*keyword))
            .count();
        if high_hits > 0 || medium_hits > 0 {
            let bump = 0.5 * high_hits as f64 + 0.2 * medium_hits as f64;
            score += bump;
            contextual_factors.push(ContextualFactor {
                factor: "scenario severity keywords".to_string(),
                impact: SupportType::Negative,
                magnitude: bump.min(1.0),
                explanation: format!(
                    "Scenario text names {high_hits} high-severity and {medium_hits} medium-severity event(s)"
                ),
                evidence_ids: Vec::new(),
            });
        }

        score
    }

    /// Blend of evidence quality (40%), quantity against 10 items as full
    /// confidence (30%), and polarity consistency (30%), clamped to
    /// [0.5, 0.95] so the engine never reports spurious certainty nor total
    /// uncertainty.
    fn confidence(
        criterion: Criterion,
        context: &AnalysisContext,
        considered: usize,
        tracker: &CitationTracker,
    ) -> f64 {
        let quantity = (considered as f64 / 10.0).min(1.0);

        let mean_weight = |support: SupportType| {
            let citations = tracker.citations_for(criterion, support);
            if citations.is_empty() {
                0.0
            } else {
                citations.iter().map(|c| c.weight).sum::<f64>() / citations.len() as f64
            }
        };
        let consistency = 1.0
            - (mean_weight(SupportType::Positive) - mean_weight(SupportType::Negative)).abs();

        let blended =
            0.4 * context.evidence_quality + 0.3 * quantity + 0.3 * consistency.clamp(0.0, 1.0);
        blended.clamp(0.5, 0.95)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
