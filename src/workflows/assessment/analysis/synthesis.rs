//! Deterministic templating over the three criterion assessments: the overall
//! narrative, contextual insights, and questionnaire-gap recommendations are
//! text assembly, not scored algorithms.

use serde::{Deserialize, Serialize};

use super::aggregation::AnalysisContext;
use super::citations::CitationReport;
use super::patterns::{CrossEvaluationPattern, ScoreAnomaly};
use super::reasoning::CriterionAssessment;
use crate::workflows::assessment::domain::RiskContext;
use crate::workflows::assessment::taxonomy::EvidenceCategory;

/// The complete outcome of one `analyze_risk` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningResult {
    pub probability: CriterionAssessment,
    pub vulnerability: CriterionAssessment,
    pub impact: CriterionAssessment,
    pub overall_assessment: String,
    pub contextual_insights: Vec<String>,
    pub cross_evaluation_patterns: Vec<CrossEvaluationPattern>,
    pub questionnaire_recommendations: Vec<String>,
    pub confidence_level: f64,
    pub citation_report: CitationReport,
}

pub(crate) fn synthesize(
    risk: &RiskContext,
    context: &AnalysisContext,
    probability: CriterionAssessment,
    vulnerability: CriterionAssessment,
    impact: CriterionAssessment,
    patterns: Vec<CrossEvaluationPattern>,
    anomalies: &[ScoreAnomaly],
    citation_report: CitationReport,
) -> ReasoningResult {
    let confidence_level =
        (probability.confidence + vulnerability.confidence + impact.confidence) / 3.0;

    let overall_assessment = overall_assessment(risk, &probability, &vulnerability, &impact);
    let contextual_insights = contextual_insights(context, anomalies);
    let questionnaire_recommendations = questionnaire_recommendations(context, &patterns);

    ReasoningResult {
        probability,
        vulnerability,
        impact,
        overall_assessment,
        contextual_insights,
        cross_evaluation_patterns: patterns,
        questionnaire_recommendations,
        confidence_level,
        citation_report,
    }
}

fn overall_assessment(
    risk: &RiskContext,
    probability: &CriterionAssessment,
    vulnerability: &CriterionAssessment,
    impact: &CriterionAssessment,
) -> String {
    // Normalized mean over the three ranges gives a single severity reading.
    let normalized = (f64::from(probability.score) / 3.0
        + f64::from(vulnerability.score) / 4.0
        + f64::from(impact.score) / 5.0)
        / 3.0;
    let severity = if normalized >= 0.8 {
        "severe"
    } else if normalized >= 0.6 {
        "high"
    } else if normalized >= 0.4 {
        "moderate"
    } else {
        "low"
    };

    format!(
        "Scenario \"{}\" against \"{}\": probability {}/3, vulnerability {}/4, impact {}/5 — overall {} risk. {} {} {}",
        risk.scenario.trim(),
        risk.target.trim(),
        probability.score,
        vulnerability.score,
        impact.score,
        severity,
        probability.explanation,
        vulnerability.explanation,
        impact.explanation
    )
}

fn contextual_insights(context: &AnalysisContext, anomalies: &[ScoreAnomaly]) -> Vec<String> {
    let mut insights = Vec::new();

    insights.push(format!(
        "{} evaluation(s) available, {} completed, mean score {:.1}/100",
        context.total_evaluations, context.completed_evaluations, context.average_score
    ));
    insights.push(format!(
        "Security maturity reads as {} with evidence quality {:.2}",
        context.maturity.label(),
        context.evidence_quality
    ));

    if !context.sector_distribution.is_empty() {
        let sectors = context
            .sector_distribution
            .iter()
            .map(|(sector, count)| format!("{sector} ({count})"))
            .collect::<Vec<_>>()
            .join(", ");
        insights.push(format!("Sector coverage: {sectors}"));
    }

    for anomaly in anomalies {
        insights.push(format!(
            "Outlier: \"{}\" scored {:.0} against a mean of {:.1} ({:.1} standard deviations)",
            anomaly.title, anomaly.score, anomaly.mean, anomaly.deviation
        ));
    }

    insights
}

fn questionnaire_recommendations(
    context: &AnalysisContext,
    patterns: &[CrossEvaluationPattern],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    for category in EvidenceCategory::ALL {
        if category == EvidenceCategory::General {
            continue;
        }
        if !context.domain_scores.contains_key(&category) {
            recommendations.push(format!(
                "No scored answers cover {}; add questionnaire items for that domain",
                category.label()
            ));
        }
    }

    if context.completed_evaluations > 0 && context.evidence_quality < 0.5 {
        recommendations.push(
            "Evidence quality is low; prefer questionnaires with facility/constraint scored answers over free text"
                .to_string(),
        );
    }

    for pattern in patterns {
        if pattern.pattern.starts_with("Recurring weakness") {
            recommendations.push(format!(
                "Re-audit the control behind: {}",
                pattern.pattern
            ));
        }
    }

    recommendations
}
