use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for completed or in-progress evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

/// The answer payload of one questionnaire item. Exactly one variant applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl ResponseValue {
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            ResponseValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResponseValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Short rendering used in evidence summaries and report output.
    pub fn summary(&self) -> String {
        match self {
            ResponseValue::Boolean(true) => "yes".to_string(),
            ResponseValue::Boolean(false) => "no".to_string(),
            ResponseValue::Number(value) => format!("{value:.0}%"),
            ResponseValue::Text(text) => text.clone(),
        }
    }
}

/// One recorded answer to one questionnaire item. Immutable once recorded.
///
/// `facility_score` (1-3) captures how much the answer reduces risk;
/// `constraint_score` (1-3) how much it increases risk. Both are optional
/// because legacy questionnaires collected plain yes/no answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub question_id: String,
    pub question_text: String,
    pub value: ResponseValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Lifecycle of one questionnaire instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    InProgress,
    Completed,
}

/// Coarse organization size bands carried as evaluation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    Small,
    Medium,
    Large,
}

/// Risk classification for a scored evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Threshold classification over a 0-100 total score.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            RiskLevel::Low
        } else if score >= 60.0 {
            RiskLevel::Medium
        } else if score >= 40.0 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    /// Rank with LOW best (0), used by monotonicity checks and sorting.
    pub const fn rank(self) -> u8 {
        match self {
            RiskLevel::Low => 0,
            RiskLevel::Medium => 1,
            RiskLevel::High => 2,
            RiskLevel::Critical => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

/// A completed (or in-progress) questionnaire instance, consumed read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub title: String,
    pub status: EvaluationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    pub sector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<CompanySize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub responses: Vec<EvaluationResponse>,
}

impl Evaluation {
    pub fn is_completed(&self) -> bool {
        self.status == EvaluationStatus::Completed
    }
}

/// The target asset and threat scenario under analysis. Free text supplied by
/// the caller; keyword extraction decides which evidence is relevant to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskContext {
    pub target: String,
    pub scenario: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl RiskContext {
    /// Combined text scanned for relevance and severity keywords.
    pub fn combined_text(&self) -> String {
        let mut text = format!("{} {}", self.target, self.scenario);
        if let Some(category) = &self.category {
            text.push(' ');
            text.push_str(category);
        }
        text.to_lowercase()
    }
}
