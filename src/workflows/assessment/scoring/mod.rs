mod advice;
mod config;
mod rules;

pub use advice::{Priority, Recommendation};
pub use config::ScoringConfig;
pub use rules::CategoryScore;

pub(crate) use rules::{is_well_formed, normalize_question, score_response};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{EvaluationResponse, RiskLevel};
use super::taxonomy::{CategoryRuleTable, EvidenceCategory};

/// Stateless engine turning one evaluation's responses into a weighted score
/// and risk classification.
pub struct ScoringEngine {
    config: ScoringConfig,
    taxonomy: CategoryRuleTable,
}

/// Full scoring output for one evaluation. Pure function of its inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub total_score: f64,
    pub risk_level: RiskLevel,
    pub section_scores: BTreeMap<EvidenceCategory, CategoryScore>,
    pub recommendations: Vec<Recommendation>,
    pub critical_issues: Vec<String>,
    pub strengths: Vec<EvidenceCategory>,
    pub improvement_areas: Vec<EvidenceCategory>,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig, taxonomy: CategoryRuleTable) -> Self {
        Self { config, taxonomy }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn taxonomy(&self) -> &CategoryRuleTable {
        &self.taxonomy
    }

    /// Score one evaluation against the sector's weight table. Unknown
    /// sectors use the default table; an empty response list yields a zero
    /// total and CRITICAL classification rather than an error.
    pub fn score(&self, responses: &[EvaluationResponse], sector: &str) -> ScoringResult {
        let sections = rules::rollup_categories(responses, &self.taxonomy, &self.config);
        let weights = self.config.weights_for(sector);

        let total_score = rules::weighted_total(&sections, weights);
        let risk_level = RiskLevel::from_score(total_score);

        let critical_issues: Vec<String> = sections
            .values()
            .flat_map(|section| section.critical_issues.iter().cloned())
            .collect();

        let strengths: Vec<EvidenceCategory> = sections
            .values()
            .filter(|section| section.mean_score >= self.config.strength_threshold)
            .map(|section| section.category)
            .collect();

        let improvement_areas: Vec<EvidenceCategory> = sections
            .values()
            .filter(|section| section.mean_score >= 40.0 && section.mean_score <= 60.0)
            .map(|section| section.category)
            .collect();

        let recommendations = advice::generate_recommendations(&sections, &self.config);

        ScoringResult {
            total_score,
            risk_level,
            section_scores: sections,
            recommendations,
            critical_issues,
            strengths,
            improvement_areas,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default(), CategoryRuleTable::default())
    }
}
