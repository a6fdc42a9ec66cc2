//! Fixed category taxonomy and the prioritized keyword tables that map free
//! question text onto it.
//!
//! The tables are data: sector or questionnaire changes extend the rule list
//! without touching the matching logic. Matching is case-insensitive substring
//! against a priority-ordered keyword list, first match wins, `General` as the
//! fallback. Questionnaire wording is French, so the keyword sets are too.

use serde::{Deserialize, Serialize};

/// The fixed evidence taxonomy shared by scoring, aggregation, and reasoning.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceCategory {
    AccessControl,
    Surveillance,
    Perimeter,
    Training,
    Procedures,
    Incidents,
    Infrastructure,
    DataProtection,
    PersonnelSecurity,
    General,
}

impl EvidenceCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            EvidenceCategory::AccessControl => "access_control",
            EvidenceCategory::Surveillance => "surveillance",
            EvidenceCategory::Perimeter => "perimeter",
            EvidenceCategory::Training => "training",
            EvidenceCategory::Procedures => "procedures",
            EvidenceCategory::Incidents => "incidents",
            EvidenceCategory::Infrastructure => "infrastructure",
            EvidenceCategory::DataProtection => "data_protection",
            EvidenceCategory::PersonnelSecurity => "personnel_security",
            EvidenceCategory::General => "general",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EvidenceCategory::AccessControl => "Access control",
            EvidenceCategory::Surveillance => "Surveillance",
            EvidenceCategory::Perimeter => "Perimeter",
            EvidenceCategory::Training => "Training",
            EvidenceCategory::Procedures => "Procedures",
            EvidenceCategory::Incidents => "Incidents",
            EvidenceCategory::Infrastructure => "Infrastructure",
            EvidenceCategory::DataProtection => "Data protection",
            EvidenceCategory::PersonnelSecurity => "Personnel security",
            EvidenceCategory::General => "General",
        }
    }

    pub const ALL: [EvidenceCategory; 10] = [
        EvidenceCategory::AccessControl,
        EvidenceCategory::Surveillance,
        EvidenceCategory::Perimeter,
        EvidenceCategory::Training,
        EvidenceCategory::Procedures,
        EvidenceCategory::Incidents,
        EvidenceCategory::Infrastructure,
        EvidenceCategory::DataProtection,
        EvidenceCategory::PersonnelSecurity,
        EvidenceCategory::General,
    ];
}

/// Categories where a maxed-out constraint answer is always a critical issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    Critical,
    Standard,
}

/// One prioritized mapping rule: the first rule whose keyword matches wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: EvidenceCategory,
    pub keywords: Vec<String>,
}

/// Ordered rule table mapping question text to the taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRuleTable {
    rules: Vec<CategoryRule>,
}

impl CategoryRuleTable {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// First-match-wins classification; unmatched text lands in `General`.
    pub fn categorize(&self, question_text: &str) -> EvidenceCategory {
        let haystack = question_text.to_lowercase();
        for rule in &self.rules {
            if rule
                .keywords
                .iter()
                .any(|keyword| haystack.contains(keyword.as_str()))
            {
                return rule.category;
            }
        }
        EvidenceCategory::General
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}

impl Default for CategoryRuleTable {
    fn default() -> Self {
        fn rule(category: EvidenceCategory, keywords: &[&str]) -> CategoryRule {
            CategoryRule {
                category,
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            }
        }

        // More specific wording first so "contrôle d'accès" is not swallowed
        // by a later generic rule.
        Self::new(vec![
            rule(
                EvidenceCategory::Infrastructure,
                &[
                    "groupe électrogène",
                    "électrogène",
                    "extincteur",
                    "détection incendie",
                    "incendie",
                    "sprinkler",
                    "électrique",
                    "énergie",
                    "local technique",
                    "bâtiment",
                ],
            ),
            rule(
                EvidenceCategory::DataProtection,
                &[
                    "sauvegarde",
                    "antivirus",
                    "informatique",
                    "données",
                    "serveur",
                    "cyber",
                ],
            ),
            rule(
                EvidenceCategory::AccessControl,
                &[
                    "contrôle d'accès",
                    "accès",
                    "badge",
                    "serrure",
                    "clé",
                    "visiteur",
                    "portier",
                ],
            ),
            rule(
                EvidenceCategory::Surveillance,
                &[
                    "surveillance",
                    "caméra",
                    "vidéo",
                    "alarme",
                    "intrusion",
                    "gardien",
                    "ronde",
                ],
            ),
            rule(
                EvidenceCategory::Perimeter,
                &[
                    "clôture",
                    "périmètre",
                    "portail",
                    "barrière",
                    "enceinte",
                    "éclairage extérieur",
                ],
            ),
            rule(
                EvidenceCategory::Training,
                &["formation", "sensibilisation", "exercice", "entraînement"],
            ),
            rule(
                EvidenceCategory::Procedures,
                &["procédure", "consigne", "protocole", "politique", "registre"],
            ),
            rule(
                EvidenceCategory::Incidents,
                &["incident", "vol", "malveillance", "accident", "sinistre"],
            ),
            rule(
                EvidenceCategory::PersonnelSecurity,
                &[
                    "personnel",
                    "habilitation",
                    "recrutement",
                    "prestataire",
                    "sous-traitant",
                ],
            ),
        ])
    }
}

/// Constraint answers in these categories are treated as critical regardless
/// of the category's mean score.
pub fn criticality(category: EvidenceCategory) -> Criticality {
    match category {
        EvidenceCategory::AccessControl
        | EvidenceCategory::Perimeter
        | EvidenceCategory::Infrastructure
        | EvidenceCategory::DataProtection => Criticality::Critical,
        _ => Criticality::Standard,
    }
}

/// Scenario vocabulary associated with each category, used to decide whether a
/// recurring weakness is relevant to the risk context under analysis.
pub fn risk_keywords(category: EvidenceCategory) -> &'static [&'static str] {
    match category {
        EvidenceCategory::AccessControl => &["accès", "intrusion", "pénétration", "entrée"],
        EvidenceCategory::Surveillance => &["surveillance", "intrusion", "vol", "détection"],
        EvidenceCategory::Perimeter => &["périmètre", "intrusion", "clôture", "enceinte"],
        EvidenceCategory::Training => &["humain", "erreur", "négligence", "formation"],
        EvidenceCategory::Procedures => &["organisation", "procédure", "réaction", "consigne"],
        EvidenceCategory::Incidents => &["incident", "vol", "sabotage", "malveillance"],
        EvidenceCategory::Infrastructure => &[
            "infrastructure",
            "électrique",
            "énergie",
            "panne",
            "courant",
            "alimentation",
            "incendie",
        ],
        EvidenceCategory::DataProtection => &[
            "cyberattaque",
            "données",
            "informatique",
            "rançongiciel",
            "cyber",
        ],
        EvidenceCategory::PersonnelSecurity => &["interne", "malveillance", "personnel"],
        EvidenceCategory::General => &[],
    }
}

const STOPWORDS: &[&str] = &[
    "avec", "dans", "pour", "vous", "votre", "vos", "cette", "sont", "être", "avez",
    "elle", "elles", "nous", "leur", "leurs", "plus", "tous", "toutes", "entre",
    "d'un", "d'une", "l'un", "l'une", "qu'il", "qu'une", "disposez", "existe",
    "mise", "place",
];

/// Lowercased word tokens of at least four characters, stopwords removed,
/// order preserved, duplicates dropped. Shared by relevance scoring and the
/// pattern detector.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for raw in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
    {
        let token = raw.trim_matches('\'');
        if token.chars().count() < 4 || STOPWORDS.contains(&token) {
            continue;
        }
        if !seen.iter().any(|existing: &String| existing.as_str() == token) {
            seen.push(token.to_string());
        }
    }
    seen
}

/// Keyword co-occurrence pairs backing the rule-based contextual relevance
/// score: (context keyword, question keyword, score). Editorial defaults.
const RELEVANCE_PAIRS: &[(&str, &str, f64)] = &[
    ("accès", "contrôle", 0.8),
    ("accès", "badge", 0.7),
    ("intrusion", "alarme", 0.8),
    ("intrusion", "clôture", 0.7),
    ("intrusion", "surveillance", 0.7),
    ("incendie", "extincteur", 0.9),
    ("incendie", "détection", 0.8),
    ("électrique", "électrogène", 0.9),
    ("panne", "électrogène", 0.8),
    ("courant", "électrogène", 0.8),
    ("alimentation", "électrogène", 0.8),
    ("vol", "surveillance", 0.7),
    ("vol", "caméra", 0.7),
    ("cyberattaque", "antivirus", 0.8),
    ("cyberattaque", "sauvegarde", 0.7),
    ("sabotage", "surveillance", 0.65),
    ("sabotage", "accès", 0.65),
];

/// Best pairwise co-occurrence score between the risk-context text and one
/// question. Returns 0.0 when no pair applies.
pub fn contextual_relevance(context_text: &str, question_text: &str) -> f64 {
    let context = context_text.to_lowercase();
    let question = question_text.to_lowercase();
    RELEVANCE_PAIRS
        .iter()
        .filter(|(ctx, q, _)| context.contains(*ctx) && question.contains(*q))
        .map(|(_, _, score)| *score)
        .fold(0.0, f64::max)
}
