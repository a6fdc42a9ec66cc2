use super::common::*;
use crate::workflows::assessment::analysis::{CrossEvaluationAggregator, MaturityLevel};
use crate::workflows::assessment::taxonomy::EvidenceCategory;

#[test]
fn empty_history_yields_zeroed_context() {
    let aggregator = CrossEvaluationAggregator::default();
    let context = aggregator.aggregate(&[], &power_context());

    assert_eq!(context.total_evaluations, 0);
    assert_eq!(context.completed_evaluations, 0);
    assert_eq!(context.average_score, 0.0);
    assert_eq!(context.evidence_quality, 0.0);
    assert!(context.relevant_evidence.is_empty());
    assert!(context.sector_distribution.is_empty());
    assert_eq!(context.maturity, MaturityLevel::Low);
}

#[test]
fn distributions_count_sectors_and_templates() {
    let aggregator = CrossEvaluationAggregator::default();
    let context = aggregator.aggregate(&power_history(), &power_context());

    assert_eq!(context.total_evaluations, 4);
    assert_eq!(context.completed_evaluations, 4);
    assert_eq!(context.sector_distribution["industrie"], 3);
    assert_eq!(context.sector_distribution["services"], 1);
    assert_eq!(context.template_distribution.len(), 4);
    assert!((context.average_score - 71.25).abs() < 1e-9);
    assert_eq!(context.maturity, MaturityLevel::High);
}

#[test]
fn co_occurrence_pairs_make_indirect_questions_relevant() {
    let aggregator = CrossEvaluationAggregator::default();
    // "panne de courant" never appears in the generator question; the
    // panne/électrogène pair carries the relevance.
    let context = aggregator.aggregate(&power_history(), &power_context());

    assert!(context
        .relevant_evidence
        .iter()
        .any(|item| item.id == "eval-1:q-gen"));
}

#[test]
fn direct_keyword_overlap_makes_questions_relevant() {
    let aggregator = CrossEvaluationAggregator::default();
    let context = aggregator.aggregate(
        &power_history(),
        &crate::workflows::assessment::domain::RiskContext {
            target: "accès au site de production".to_string(),
            scenario: "intrusion hors horaires".to_string(),
            category: None,
        },
    );

    assert!(context
        .relevant_evidence
        .iter()
        .any(|item| item.category == EvidenceCategory::AccessControl));
    for item in &context.relevant_evidence {
        assert!(item.relevance > 0.6);
        assert!((0.0..=1.0).contains(&item.confidence));
    }
}

#[test]
fn unrelated_questions_are_filtered_out() {
    let aggregator = CrossEvaluationAggregator::default();
    let context = aggregator.aggregate(&power_history(), &theft_context());

    // The generator question has no overlap and no pair with a theft scenario.
    assert!(!context
        .relevant_evidence
        .iter()
        .any(|item| item.id.ends_with(":q-gen")));
}

#[test]
fn domain_scores_average_across_evaluations() {
    let aggregator = CrossEvaluationAggregator::default();
    let context = aggregator.aggregate(&power_history(), &power_context());

    // Generator: 3 no, 1 yes -> 25. Surveillance: 3 yes, 1 no -> 75.
    assert!((context.domain_scores[&EvidenceCategory::Infrastructure] - 25.0).abs() < 1e-9);
    assert!((context.domain_scores[&EvidenceCategory::Surveillance] - 75.0).abs() < 1e-9);
    assert!((context.domain_scores[&EvidenceCategory::AccessControl] - 75.0).abs() < 1e-9);
}

#[test]
fn evidence_quality_reflects_answer_structure() {
    let aggregator = CrossEvaluationAggregator::default();
    let mut history = power_history();
    // Upgrade one generator answer to a fully scored response.
    history[0].responses[0] = scored_response(
        "q-gen",
        "Disposez-vous d'un groupe électrogène de secours ?",
        false,
        1,
        3,
    );

    let context = aggregator.aggregate(&history, &power_context());

    assert!(context.evidence_quality > 0.0);
    assert!(context.evidence_quality <= 1.0);

    let plain = aggregator.aggregate(&power_history(), &power_context());
    // Scored answers raise the quality reading above the all-boolean history.
    assert!(context.evidence_quality > plain.evidence_quality);
}

#[test]
fn aggregation_is_deterministic() {
    let aggregator = CrossEvaluationAggregator::default();
    let first = aggregator.aggregate(&power_history(), &power_context());
    let second = aggregator.aggregate(&power_history(), &power_context());
    assert_eq!(first, second);
}
