use super::common::*;
use crate::workflows::assessment::analysis::{
    NO_NEGATIVE_EVIDENCE, NO_POSITIVE_EVIDENCE,
};
use crate::workflows::assessment::domain::{ResponseValue, RiskContext};

fn assert_scores_in_range(result: &crate::workflows::assessment::analysis::ReasoningResult) {
    assert!((1..=3).contains(&result.probability.score));
    assert!((1..=4).contains(&result.vulnerability.score));
    assert!((1..=5).contains(&result.impact.score));
}

#[tokio::test]
async fn empty_history_yields_in_range_placeholder_result() {
    let service = deterministic_service();
    let context = RiskContext {
        target: "site de stockage".to_string(),
        scenario: "incident mineur".to_string(),
        category: None,
    };

    let result = service.analyze_risk(&context, &[]).await;

    assert_scores_in_range(&result);
    assert_eq!(result.probability.positive_evidence, vec![NO_POSITIVE_EVIDENCE]);
    assert_eq!(result.probability.negative_evidence, vec![NO_NEGATIVE_EVIDENCE]);
    for assessment in [&result.probability, &result.vulnerability, &result.impact] {
        assert!((0.5..=0.95).contains(&assessment.confidence));
    }
    assert!(!result.citation_report.is_valid);
    assert!(result.cross_evaluation_patterns.is_empty());
}

#[tokio::test]
async fn analyze_risk_is_idempotent() {
    let service = deterministic_service();
    let history = power_history();
    let context = power_context();

    let first = service.analyze_risk(&context, &history).await;
    let second = service.analyze_risk(&context, &history).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn negative_boolean_evidence_raises_vulnerability() {
    let service = deterministic_service();
    let mut history = power_history();
    for evaluation in &mut history {
        for response in &mut evaluation.responses {
            if response.value.as_boolean().is_some() {
                response.value = ResponseValue::Boolean(false);
            }
        }
    }
    let context = RiskContext {
        target: "accès au bâtiment principal".to_string(),
        scenario: "intrusion nocturne".to_string(),
        category: None,
    };

    let result = service.analyze_risk(&context, &history).await;

    // Surveillance and access questions all answer no, so vulnerability
    // climbs above its base of 2.
    assert!(result.vulnerability.score >= 3);
    assert!(result
        .vulnerability
        .negative_evidence
        .iter()
        .any(|entry| entry != NO_NEGATIVE_EVIDENCE));
}

#[tokio::test]
async fn positive_boolean_evidence_lowers_vulnerability() {
    let service = deterministic_service();
    let mut history = power_history();
    for evaluation in &mut history {
        for response in &mut evaluation.responses {
            response.value = ResponseValue::Boolean(true);
        }
    }
    let context = RiskContext {
        target: "accès au bâtiment principal".to_string(),
        scenario: "intrusion nocturne".to_string(),
        category: None,
    };

    let result = service.analyze_risk(&context, &history).await;

    assert!(result.vulnerability.score <= 2);
    assert!(result
        .vulnerability
        .positive_evidence
        .iter()
        .any(|entry| entry != NO_POSITIVE_EVIDENCE));
}

#[tokio::test]
async fn sector_multiplier_raises_impact_for_heavy_industry() {
    let service = deterministic_service();

    let reframe = |sector: &str| {
        power_history()
            .into_iter()
            .map(|mut evaluation| {
                evaluation.sector = sector.to_string();
                evaluation
            })
            .collect::<Vec<_>>()
    };

    let mining = service
        .analyze_risk(&power_context(), &reframe("industrie minière"))
        .await;
    let services = service
        .analyze_risk(&power_context(), &reframe("services"))
        .await;

    assert!(mining.impact.score >= services.impact.score);
    assert!(mining
        .impact
        .contextual_factors
        .iter()
        .any(|factor| factor.factor.contains("sector impact multiplier")));
}

#[tokio::test]
async fn severe_scenario_keywords_push_impact_up() {
    let service = deterministic_service();
    let history = power_history();

    let calm = RiskContext {
        target: "alimentation électrique du site".to_string(),
        scenario: "panne de courant prolongée".to_string(),
        category: None,
    };
    let severe = RiskContext {
        target: "alimentation électrique du site".to_string(),
        scenario: "sabotage et explosion d'un transformateur, panne de courant prolongée"
            .to_string(),
        category: None,
    };

    let calm_result = service.analyze_risk(&calm, &history).await;
    let severe_result = service.analyze_risk(&severe, &history).await;

    assert!(severe_result.impact.score >= calm_result.impact.score);
    assert!(severe_result
        .impact
        .contextual_factors
        .iter()
        .any(|factor| factor.factor.contains("scenario severity")));
}

#[tokio::test]
async fn failing_gateway_degrades_to_documented_fallback() {
    let service = gateway_service(FailingGateway);
    let result = service.analyze_risk(&power_context(), &power_history()).await;

    for (assessment, midpoint) in [
        (&result.probability, 2),
        (&result.vulnerability, 3),
        (&result.impact, 3),
    ] {
        assert_eq!(assessment.score, midpoint);
        assert!((assessment.confidence - 0.3).abs() < 1e-9);
        assert!(assessment.explanation.contains("connection refused"));
    }
}

#[tokio::test]
async fn gateway_refinement_replaces_score_within_contract() {
    let service = gateway_service(CeilingGateway);
    let result = service.analyze_risk(&power_context(), &power_history()).await;

    assert_eq!(result.probability.score, 3);
    assert_eq!(result.vulnerability.score, 4);
    assert_eq!(result.impact.score, 5);
    assert!((result.probability.confidence - 0.9).abs() < 1e-9);
    assert!(result.probability.explanation.contains("refined"));
    assert!(result
        .probability
        .positive_evidence
        .iter()
        .any(|entry| entry == "external corroboration"));
}

#[tokio::test]
async fn out_of_range_gateway_output_is_treated_as_failure() {
    let service = gateway_service(OutOfRangeGateway);
    let result = service.analyze_risk(&power_context(), &power_history()).await;

    assert_eq!(result.impact.score, 3);
    assert!((result.impact.confidence - 0.3).abs() < 1e-9);
    assert!(result.impact.explanation.contains("malformed"));
}

#[tokio::test]
async fn synthesis_summarizes_context_and_gaps() {
    let service = deterministic_service();
    let result = service.analyze_risk(&power_context(), &power_history()).await;

    assert!(result.overall_assessment.contains("probability"));
    assert!(result
        .contextual_insights
        .iter()
        .any(|insight| insight.contains("4 evaluation(s)")));
    // The history never touches training or procedures.
    assert!(result
        .questionnaire_recommendations
        .iter()
        .any(|gap| gap.contains("Training")));
    assert!((0.5..=0.95).contains(&result.confidence_level));
}
