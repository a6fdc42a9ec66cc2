use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::workflows::assessment::taxonomy::EvidenceCategory;

/// Data-driven scoring configuration: sector weight tables, the critical
/// keyword list, and the recommendation thresholds.
///
/// The numeric values are editorial defaults inherited from the questionnaire
/// authors; the mechanisms (lookup, fallback, clamping) are the contract, the
/// specific numbers are not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Category weights per sector. Each table sums to 1.0.
    pub sector_weights: BTreeMap<String, BTreeMap<EvidenceCategory, f64>>,
    /// Fallback table for sectors without a dedicated entry.
    pub default_weights: BTreeMap<EvidenceCategory, f64>,
    /// Boolean "no" answers on questions containing one of these are always
    /// critical issues, regardless of the category score.
    pub critical_keywords: Vec<String>,
    /// Sections at or above this mean score are reported as strengths.
    pub strength_threshold: f64,
    /// Sections below this mean score get a MEDIUM recommendation.
    pub low_section_threshold: f64,
    /// Sections with a completion rate below this get a LOW recommendation.
    pub completion_threshold: f64,
}

impl ScoringConfig {
    /// Weight table for a sector; unknown sectors fall back to the default.
    pub fn weights_for(&self, sector: &str) -> &BTreeMap<EvidenceCategory, f64> {
        self.sector_weights
            .get(sector.trim().to_lowercase().as_str())
            .unwrap_or(&self.default_weights)
    }
}

fn weight_table(entries: &[(EvidenceCategory, f64)]) -> BTreeMap<EvidenceCategory, f64> {
    entries.iter().copied().collect()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let default_weights = weight_table(&[
            (EvidenceCategory::AccessControl, 0.15),
            (EvidenceCategory::Surveillance, 0.12),
            (EvidenceCategory::Perimeter, 0.10),
            (EvidenceCategory::Training, 0.08),
            (EvidenceCategory::Procedures, 0.10),
            (EvidenceCategory::Incidents, 0.10),
            (EvidenceCategory::Infrastructure, 0.15),
            (EvidenceCategory::DataProtection, 0.10),
            (EvidenceCategory::PersonnelSecurity, 0.05),
            (EvidenceCategory::General, 0.05),
        ]);

        let mut sector_weights = BTreeMap::new();
        sector_weights.insert(
            "industrie".to_string(),
            weight_table(&[
                (EvidenceCategory::AccessControl, 0.12),
                (EvidenceCategory::Surveillance, 0.10),
                (EvidenceCategory::Perimeter, 0.15),
                (EvidenceCategory::Training, 0.08),
                (EvidenceCategory::Procedures, 0.08),
                (EvidenceCategory::Incidents, 0.10),
                (EvidenceCategory::Infrastructure, 0.20),
                (EvidenceCategory::DataProtection, 0.07),
                (EvidenceCategory::PersonnelSecurity, 0.05),
                (EvidenceCategory::General, 0.05),
            ]),
        );
        sector_weights.insert(
            "services".to_string(),
            weight_table(&[
                (EvidenceCategory::AccessControl, 0.15),
                (EvidenceCategory::Surveillance, 0.10),
                (EvidenceCategory::Perimeter, 0.05),
                (EvidenceCategory::Training, 0.10),
                (EvidenceCategory::Procedures, 0.12),
                (EvidenceCategory::Incidents, 0.08),
                (EvidenceCategory::Infrastructure, 0.10),
                (EvidenceCategory::DataProtection, 0.20),
                (EvidenceCategory::PersonnelSecurity, 0.05),
                (EvidenceCategory::General, 0.05),
            ]),
        );
        sector_weights.insert(
            "santé".to_string(),
            weight_table(&[
                (EvidenceCategory::AccessControl, 0.18),
                (EvidenceCategory::Surveillance, 0.10),
                (EvidenceCategory::Perimeter, 0.08),
                (EvidenceCategory::Training, 0.10),
                (EvidenceCategory::Procedures, 0.12),
                (EvidenceCategory::Incidents, 0.10),
                (EvidenceCategory::Infrastructure, 0.12),
                (EvidenceCategory::DataProtection, 0.10),
                (EvidenceCategory::PersonnelSecurity, 0.05),
                (EvidenceCategory::General, 0.05),
            ]),
        );

        Self {
            sector_weights,
            default_weights,
            critical_keywords: [
                "clôture",
                "contrôle d'accès",
                "surveillance",
                "extincteur",
                "détection incendie",
                "groupe électrogène",
                "sauvegarde",
                "antivirus",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            strength_threshold: 80.0,
            low_section_threshold: 40.0,
            completion_threshold: 0.8,
        }
    }
}
