use serde::{Deserialize, Serialize};

use crate::workflows::assessment::taxonomy::EvidenceCategory;

/// The three independently scored dimensions of a risk scenario.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Probability,
    Vulnerability,
    Impact,
}

impl Criterion {
    pub const ALL: [Criterion; 3] = [
        Criterion::Probability,
        Criterion::Vulnerability,
        Criterion::Impact,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Criterion::Probability => "probability",
            Criterion::Vulnerability => "vulnerability",
            Criterion::Impact => "impact",
        }
    }
}

/// The shared scoring shape of one criterion: score range, base score,
/// adjustment step, percentage thresholds, and the evidence vocabulary that
/// makes an item relevant to it.
#[derive(Debug, Clone, Copy)]
pub struct CriterionProfile {
    pub criterion: Criterion,
    pub min: u8,
    pub max: u8,
    pub base: f64,
    pub step: f64,
    pub low_threshold: f64,
    pub high_threshold: f64,
    pub keywords: &'static [&'static str],
}

impl CriterionProfile {
    pub fn for_criterion(criterion: Criterion) -> Self {
        match criterion {
            Criterion::Probability => Self {
                criterion,
                min: 1,
                max: 3,
                base: 2.0,
                step: 0.3,
                low_threshold: 30.0,
                high_threshold: 80.0,
                keywords: &[
                    "maintenance",
                    "formation",
                    "procédure",
                    "contrôle",
                    "incident",
                ],
            },
            Criterion::Vulnerability => Self {
                criterion,
                min: 1,
                max: 4,
                base: 2.0,
                step: 0.4,
                low_threshold: 40.0,
                high_threshold: 85.0,
                keywords: &[
                    "protection",
                    "sécurité",
                    "surveillance",
                    "accès",
                    "clôture",
                    "alarme",
                ],
            },
            Criterion::Impact => Self {
                criterion,
                min: 1,
                max: 5,
                base: 3.0,
                step: 0.5,
                low_threshold: 50.0,
                high_threshold: 90.0,
                keywords: &["critique", "essentiel", "continuité", "récupération"],
            },
        }
    }

    /// Documented fallback score when the reasoning oracle fails.
    pub fn midpoint(&self) -> u8 {
        (f64::from(self.min + self.max) / 2.0).round() as u8
    }

    pub fn clamp_score(&self, raw: f64) -> u8 {
        raw.round().clamp(f64::from(self.min), f64::from(self.max)) as u8
    }
}

/// Which criteria a weakness in a category bears on. Editorial defaults: the
/// mechanism (a category-to-criteria table consulted by the pattern detector
/// and reasoner) is the contract.
pub fn criteria_for_category(category: EvidenceCategory) -> &'static [Criterion] {
    match category {
        EvidenceCategory::AccessControl
        | EvidenceCategory::Surveillance
        | EvidenceCategory::Perimeter => &[Criterion::Vulnerability],
        EvidenceCategory::Training
        | EvidenceCategory::Procedures
        | EvidenceCategory::Incidents => &[Criterion::Probability],
        EvidenceCategory::Infrastructure | EvidenceCategory::DataProtection => {
            &[Criterion::Vulnerability, Criterion::Impact]
        }
        EvidenceCategory::PersonnelSecurity => &[Criterion::Probability, Criterion::Vulnerability],
        EvidenceCategory::General => &[],
    }
}

/// Sector impact multipliers applied by the impact reasoner. Substring lookup
/// over the lowercased sector name, default 1.0.
const SECTOR_IMPACT: &[(&str, f64)] = &[
    ("minier", 1.4),
    ("mines", 1.4),
    ("industrie", 1.2),
    ("énergie", 1.3),
    ("santé", 1.1),
    ("services", 0.8),
];

pub fn sector_impact_multiplier(sector: &str) -> f64 {
    let sector = sector.to_lowercase();
    SECTOR_IMPACT
        .iter()
        .find(|(name, _)| sector.contains(*name))
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(1.0)
}

/// Scenario severity vocabulary scanned by the impact reasoner.
pub const HIGH_SEVERITY_KEYWORDS: &[&str] = &[
    "explosion",
    "sabotage",
    "cyberattaque",
    "attentat",
    "effondrement",
];

pub const MEDIUM_SEVERITY_KEYWORDS: &[&str] =
    &["panne", "défaillance", "coupure", "fuite", "dégradation"];
