use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::ScoringConfig;
use super::rules::CategoryScore;
use crate::workflows::assessment::taxonomy::EvidenceCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

/// Actionable follow-up attached to a scored section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: EvidenceCategory,
    pub message: String,
}

/// One HIGH item per section with critical issues, one MEDIUM per weak
/// section without them, one LOW per under-answered section. Output is sorted
/// by priority with ties keeping category order.
pub(crate) fn generate_recommendations(
    sections: &BTreeMap<EvidenceCategory, CategoryScore>,
    config: &ScoringConfig,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for (category, section) in sections {
        if !section.critical_issues.is_empty() {
            recommendations.push(Recommendation {
                priority: Priority::High,
                category: *category,
                message: format!(
                    "Remediate {} critical issue(s) in {}: {}",
                    section.critical_issues.len(),
                    category.label(),
                    section.critical_issues.join("; ")
                ),
            });
        } else if section.mean_score < config.low_section_threshold {
            recommendations.push(Recommendation {
                priority: Priority::Medium,
                category: *category,
                message: format!(
                    "Strengthen {} controls (section scores {:.0}/100)",
                    category.label(),
                    section.mean_score
                ),
            });
        }

        if section.completion_rate < config.completion_threshold {
            recommendations.push(Recommendation {
                priority: Priority::Low,
                category: *category,
                message: format!(
                    "Complete the {} questionnaire section ({:.0}% answered)",
                    category.label(),
                    section.completion_rate * 100.0
                ),
            });
        }
    }

    recommendations.sort_by_key(|recommendation| recommendation.priority.rank());
    recommendations
}
