use super::common::*;
use crate::workflows::assessment::analysis::{Criterion, PatternDetector};

#[test]
fn detectors_return_empty_below_minimum_sample() {
    let detector = PatternDetector::default();
    let history: Vec<_> = power_history().into_iter().take(2).collect();

    assert!(detector.detect_patterns(&history, &power_context()).is_empty());
    assert!(detector.detect_anomalies(&history).is_empty());
}

#[test]
fn recurring_weakness_surfaces_for_matching_context() {
    let detector = PatternDetector::default();
    let patterns = detector.detect_patterns(&power_history(), &power_context());

    // Generator answered no in 3/4 evaluations and the scenario is a power
    // outage, so the weakness must survive the relevance gate.
    let weakness = patterns
        .iter()
        .find(|pattern| pattern.pattern.contains("électrogène"))
        .expect("generator weakness detected");
    assert!((weakness.strength - 0.75).abs() < 1e-9);
    assert_eq!(weakness.evaluation_ids.len(), 3);
    assert!(weakness.risk_relevance.contains(&Criterion::Impact));
}

#[test]
fn recurring_weakness_is_dropped_for_unrelated_context() {
    let detector = PatternDetector::default();
    let patterns = detector.detect_patterns(&power_history(), &theft_context());

    assert!(!patterns
        .iter()
        .any(|pattern| pattern.pattern.contains("électrogène")));
}

#[test]
fn infrequent_weaknesses_stay_below_the_floor() {
    let detector = PatternDetector::default();
    // Surveillance is no in only 1/4 evaluations: under the 30% floor.
    let patterns = detector.detect_patterns(&power_history(), &power_context());

    assert!(!patterns
        .iter()
        .any(|pattern| pattern.pattern.contains("surveillance vidéo")));
}

#[test]
fn score_degradation_emits_a_temporal_pattern() {
    let detector = PatternDetector::default();
    let mut history = power_history();
    history[0].total_score = Some(88.0);
    history[1].total_score = Some(84.0);
    history[2].total_score = Some(62.0);
    history[3].total_score = Some(58.0);

    let patterns = detector.detect_patterns(&history, &power_context());

    let degradation = patterns
        .iter()
        .find(|pattern| pattern.pattern.contains("degradation"))
        .expect("degradation pattern detected");
    assert!((degradation.strength - 0.26).abs() < 1e-9);
    assert_eq!(degradation.evaluation_ids.len(), 4);
    assert!(degradation.risk_relevance.contains(&Criterion::Probability));
    assert!(degradation
        .risk_relevance
        .contains(&Criterion::Vulnerability));
}

#[test]
fn stable_scores_emit_no_temporal_pattern() {
    let detector = PatternDetector::default();
    let patterns = detector.detect_patterns(&power_history(), &power_context());

    assert!(!patterns.iter().any(|p| p.pattern.contains("degradation")));
    assert!(!patterns.iter().any(|p| p.pattern.contains("improvement")));
}

#[test]
fn sector_grouping_selects_only_multi_evaluation_sectors() {
    let detector = PatternDetector::default();
    let history = power_history();
    let completed: Vec<_> = history.iter().collect();

    let candidates = detector.sector_candidates(&completed);

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].0, "industrie");
    assert_eq!(candidates[0].1.len(), 3);
}

#[test]
fn tight_cluster_with_spread_is_not_anomalous() {
    let detector = PatternDetector::default();
    let mut history = power_history().into_iter().take(3).collect::<Vec<_>>();
    history[0].total_score = Some(85.0);
    history[1].total_score = Some(65.0);
    history[2].total_score = Some(20.0);

    // mean 56.7, population stdev ~27: every score sits inside two sigmas.
    assert!(detector.detect_anomalies(&history).is_empty());
}

#[test]
fn far_outlier_is_flagged_with_title_and_score() {
    let detector = PatternDetector::default();
    let mut history = Vec::new();
    for (index, score) in [80.0, 80.0, 80.0, 80.0, 80.0, 20.0].iter().enumerate() {
        history.push(completed_evaluation(
            &format!("eval-{index}"),
            &format!("Audit {index}"),
            "industrie",
            *score,
            (index + 1) as u32,
            Vec::new(),
        ));
    }

    let anomalies = detector.detect_anomalies(&history);

    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].title, "Audit 5");
    assert_eq!(anomalies[0].score, 20.0);
    assert!(anomalies[0].deviation > 2.0);
}

#[test]
fn identical_scores_produce_no_anomalies() {
    let detector = PatternDetector::default();
    let mut history = power_history();
    for evaluation in &mut history {
        evaluation.total_score = Some(70.0);
    }

    assert!(detector.detect_anomalies(&history).is_empty());
}
