//! Security-posture assessment workflows: questionnaire scoring and
//! evidence-based risk reasoning over historical evaluations.

pub mod analysis;
pub mod domain;
pub mod router;
pub mod scoring;
pub mod service;
pub mod taxonomy;

#[cfg(test)]
mod tests;

pub use analysis::{
    AnalysisContext, Citation, CitationReport, CitationTracker, ContextualFactor, Criterion,
    CriterionAssessment, CrossEvaluationAggregator, CrossEvaluationPattern, EvidenceItem,
    GatewayError, GatewayRequest, GatewayResponse, MaturityLevel, NullGateway, PatternDetector,
    ReasoningGateway, ReasoningResult, ScoreAnomaly, SupportType,
};
pub use domain::{
    CompanySize, Evaluation, EvaluationId, EvaluationResponse, EvaluationStatus, ResponseValue,
    RiskContext, RiskLevel,
};
pub use router::{assessment_router, AnalyzeRequest, ScoreRequest};
pub use scoring::{CategoryScore, Priority, Recommendation, ScoringConfig, ScoringEngine, ScoringResult};
pub use service::RiskAnalysisService;
pub use taxonomy::{CategoryRule, CategoryRuleTable, EvidenceCategory};
