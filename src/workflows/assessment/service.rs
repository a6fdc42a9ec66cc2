use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use super::analysis::{
    synthesize, validate_response, AnalysisContext, CitationTracker, Criterion,
    CriterionAssessment, CriterionProfile, CriterionReasoner, CrossEvaluationAggregator,
    CrossEvaluationPattern, GatewayError, GatewayRequest, GatewayResponse, NullGateway,
    PatternDetector, ReasoningGateway, ReasoningResult,
};
use super::domain::{Evaluation, EvaluationResponse, RiskContext};
use super::scoring::{ScoringConfig, ScoringEngine, ScoringResult};
use super::taxonomy::CategoryRuleTable;
use crate::config::GatewayConfig;

/// Facade composing the scoring engine, aggregator, pattern detector, and
/// criterion reasoner, with an optional external reasoning gateway behind a
/// timeout/fallback policy.
///
/// `analyze_risk` never fails for a well-formed risk context: oracle
/// failures degrade to the documented fallback, empty histories degrade to
/// zeroed statistics and placeholder evidence.
pub struct RiskAnalysisService<G> {
    scoring: ScoringEngine,
    aggregator: CrossEvaluationAggregator,
    detector: PatternDetector,
    gateway: Option<Arc<G>>,
    gateway_config: GatewayConfig,
}

impl RiskAnalysisService<NullGateway> {
    /// Fully deterministic service: no oracle, criterion scores stand as
    /// computed locally.
    pub fn deterministic() -> Self {
        Self {
            scoring: ScoringEngine::default(),
            aggregator: CrossEvaluationAggregator::default(),
            detector: PatternDetector::default(),
            gateway: None,
            gateway_config: GatewayConfig::default(),
        }
    }
}

impl<G> RiskAnalysisService<G>
where
    G: ReasoningGateway + 'static,
{
    pub fn new(
        config: ScoringConfig,
        taxonomy: CategoryRuleTable,
        gateway: Option<Arc<G>>,
        gateway_config: GatewayConfig,
    ) -> Self {
        Self {
            scoring: ScoringEngine::new(config, taxonomy.clone()),
            aggregator: CrossEvaluationAggregator::new(taxonomy.clone()),
            detector: PatternDetector::new(taxonomy),
            gateway,
            gateway_config,
        }
    }

    pub fn with_gateway(gateway: Arc<G>, gateway_config: GatewayConfig) -> Self {
        Self::new(
            ScoringConfig::default(),
            CategoryRuleTable::default(),
            Some(gateway),
            gateway_config,
        )
    }

    /// Score one evaluation's responses against its sector weight table.
    pub fn score_evaluation(
        &self,
        responses: &[EvaluationResponse],
        sector: &str,
    ) -> ScoringResult {
        self.scoring.score(responses, sector)
    }

    /// Full evidence-backed judgment of one risk scenario over the supplied
    /// evaluation history.
    pub async fn analyze_risk(
        &self,
        risk: &RiskContext,
        evaluations: &[Evaluation],
    ) -> ReasoningResult {
        debug!(
            evaluations = evaluations.len(),
            target = %risk.target,
            "starting risk analysis"
        );

        let context = self.aggregator.aggregate(evaluations, risk);
        let patterns = self.detector.detect_patterns(evaluations, risk);
        let anomalies = self.detector.detect_anomalies(evaluations);

        let mut tracker = CitationTracker::new();
        tracker.add_evidence_from_evaluations(evaluations, risk, self.scoring.taxonomy());

        let mut assess = |criterion| {
            CriterionReasoner::assess(criterion, &context, &patterns, risk, &mut tracker)
        };
        let mut probability = assess(Criterion::Probability);
        let mut vulnerability = assess(Criterion::Vulnerability);
        let mut impact = assess(Criterion::Impact);

        if let Some(gateway) = self.gateway.clone() {
            (probability, vulnerability, impact) = self
                .refine_assessments(
                    gateway.as_ref(),
                    (probability, vulnerability, impact),
                    &context,
                    &patterns,
                    &tracker,
                )
                .await;
        }

        let citation_report = tracker.validate();

        synthesize(
            risk,
            &context,
            probability,
            vulnerability,
            impact,
            patterns,
            &anomalies,
            citation_report,
        )
    }

    /// Dispatch the three criterion requests concurrently; retry each failed
    /// call once sequentially with a rate-limit delay, then substitute the
    /// deterministic fallback.
    async fn refine_assessments(
        &self,
        gateway: &G,
        assessments: (CriterionAssessment, CriterionAssessment, CriterionAssessment),
        context: &AnalysisContext,
        patterns: &[CrossEvaluationPattern],
        tracker: &CitationTracker,
    ) -> (CriterionAssessment, CriterionAssessment, CriterionAssessment) {
        let (probability, vulnerability, impact) = assessments;
        let probability_request = self.build_request(&probability, context, patterns, tracker);
        let vulnerability_request = self.build_request(&vulnerability, context, patterns, tracker);
        let impact_request = self.build_request(&impact, context, patterns, tracker);

        let (first, second, third) = tokio::join!(
            self.call_gateway(gateway, &probability_request),
            self.call_gateway(gateway, &vulnerability_request),
            self.call_gateway(gateway, &impact_request),
        );

        (
            self.resolve(gateway, probability, &probability_request, first).await,
            self.resolve(gateway, vulnerability, &vulnerability_request, second).await,
            self.resolve(gateway, impact, &impact_request, third).await,
        )
    }

    /// Settle one criterion after the concurrent pass: a failed call gets one
    /// sequential retry behind the rate-limit delay before falling back.
    async fn resolve(
        &self,
        gateway: &G,
        assessment: CriterionAssessment,
        request: &GatewayRequest,
        outcome: Result<GatewayResponse, GatewayError>,
    ) -> CriterionAssessment {
        let outcome = match outcome {
            Ok(response) => Ok(response),
            Err(err) => {
                warn!(
                    criterion = assessment.criterion.label(),
                    error = %err,
                    "concurrent gateway dispatch failed, retrying sequentially"
                );
                sleep(Duration::from_millis(self.gateway_config.retry_delay_ms)).await;
                self.call_gateway(gateway, request).await
            }
        };

        match outcome {
            Ok(response) => apply_refinement(assessment, response),
            Err(err) => fallback_assessment(assessment, &err),
        }
    }

    async fn call_gateway(
        &self,
        gateway: &G,
        request: &GatewayRequest,
    ) -> Result<GatewayResponse, GatewayError> {
        let limit = Duration::from_millis(self.gateway_config.timeout_ms);
        match timeout(limit, gateway.analyze(request)).await {
            Ok(result) => result.and_then(|response| validate_response(request, response)),
            Err(_) => Err(GatewayError::Timeout(self.gateway_config.timeout_ms)),
        }
    }

    fn build_request(
        &self,
        assessment: &CriterionAssessment,
        context: &AnalysisContext,
        patterns: &[CrossEvaluationPattern],
        tracker: &CitationTracker,
    ) -> GatewayRequest {
        let profile = CriterionProfile::for_criterion(assessment.criterion);

        let evidence_summary = tracker
            .find_relevant_evidence(assessment.criterion, 8)
            .iter()
            .map(|item| item.summary())
            .collect::<Vec<_>>()
            .join("\n");

        let domain_scores: BTreeMap<String, f64> = context
            .domain_scores
            .iter()
            .map(|(category, score)| (category.as_str().to_string(), *score))
            .collect();

        let strengths = context
            .domain_scores
            .iter()
            .filter(|(_, score)| **score >= 80.0)
            .map(|(category, score)| format!("{} at {score:.0}/100", category.label()))
            .collect();

        GatewayRequest {
            criterion: assessment.criterion,
            score_min: profile.min,
            score_max: profile.max,
            evidence_summary,
            domain_scores,
            patterns: patterns.iter().map(|p| p.pattern.clone()).collect(),
            weaknesses: assessment.negative_evidence.clone(),
            strengths,
            instructions: format!(
                "Assess the {} of the scenario on a scale of {} to {} and justify the score strictly from the evidence provided",
                assessment.criterion.label(),
                profile.min,
                profile.max
            ),
        }
    }
}

/// Replace a placeholder-only list with real points, otherwise append.
fn merge_evidence(mut deterministic: Vec<String>, refined: Vec<String>, placeholder: &str) -> Vec<String> {
    if refined.is_empty() {
        return deterministic;
    }
    if deterministic.len() == 1 && deterministic[0] == placeholder {
        deterministic.clear();
    }
    deterministic.extend(refined);
    deterministic
}

fn apply_refinement(
    mut assessment: CriterionAssessment,
    response: GatewayResponse,
) -> CriterionAssessment {
    let profile = CriterionProfile::for_criterion(assessment.criterion);
    assessment.score = profile.clamp_score(response.score);
    assessment.explanation = response.explanation;
    assessment.confidence = response.confidence.clamp(0.5, 0.95);
    assessment.positive_evidence = merge_evidence(
        std::mem::take(&mut assessment.positive_evidence),
        response.positive_points,
        super::analysis::NO_POSITIVE_EVIDENCE,
    );
    assessment.negative_evidence = merge_evidence(
        std::mem::take(&mut assessment.negative_evidence),
        response.negative_points,
        super::analysis::NO_NEGATIVE_EVIDENCE,
    );
    assessment.reasoning = format!(
        "{} Refined by the external reasoning gateway.",
        assessment.reasoning
    );
    assessment
}

/// The documented oracle-failure fallback: mid-range score, fixed low
/// confidence, and the failure reason embedded for diagnosability. The
/// deterministic evidence trail is kept since it remains valid.
fn fallback_assessment(
    mut assessment: CriterionAssessment,
    error: &GatewayError,
) -> CriterionAssessment {
    let profile = CriterionProfile::for_criterion(assessment.criterion);
    assessment.score = profile.midpoint();
    assessment.confidence = 0.3;
    assessment.explanation = format!(
        "External reasoning unavailable ({error}); mid-range fallback score applied for {}",
        assessment.criterion.label()
    );
    assessment.reasoning = format!(
        "{} Gateway refinement failed; deterministic evidence retained with the fallback score.",
        assessment.reasoning
    );
    assessment
}
