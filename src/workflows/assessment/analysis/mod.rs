//! Cross-evaluation analysis pipeline: evidence extraction, aggregation,
//! pattern mining, criterion reasoning, and citation bookkeeping.
//!
//! Data flows strictly upward — evidence, then the aggregated context, then
//! patterns, then criterion scores, then citations. Every stage is pure over
//! its inputs except the `CitationTracker`, which one analysis run owns
//! exclusively.

mod aggregation;
mod citations;
mod criterion;
mod evidence;
mod gateway;
mod patterns;
mod reasoning;
mod synthesis;

pub use aggregation::{AnalysisContext, CrossEvaluationAggregator, MaturityLevel};
pub use citations::{Citation, CitationReport, CitationTracker, SupportType};
pub use criterion::{
    criteria_for_category, sector_impact_multiplier, Criterion, CriterionProfile,
};
pub use evidence::{extract_evidence, EvidenceItem, ResponseKind};
pub use gateway::{
    GatewayError, GatewayRequest, GatewayResponse, NullGateway, ReasoningGateway,
};
pub use patterns::{CrossEvaluationPattern, PatternDetector, ScoreAnomaly};
pub use reasoning::{
    ContextualFactor, CriterionAssessment, CriterionReasoner, NO_NEGATIVE_EVIDENCE,
    NO_POSITIVE_EVIDENCE,
};
pub use synthesis::ReasoningResult;

pub(crate) use gateway::validate_response;
pub(crate) use synthesis::synthesize;
