use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use super::criterion::Criterion;

/// Structured evidence-context document sent to the external reasoning
/// oracle. The score range is part of the contract: responses outside it are
/// treated as malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayRequest {
    pub criterion: Criterion,
    pub score_min: u8,
    pub score_max: u8,
    pub evidence_summary: String,
    pub domain_scores: BTreeMap<String, f64>,
    pub patterns: Vec<String>,
    pub weaknesses: Vec<String>,
    pub strengths: Vec<String>,
    pub instructions: String,
}

/// Refined narrative judgment returned by the oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub score: f64,
    pub explanation: String,
    #[serde(default)]
    pub positive_points: Vec<String>,
    #[serde(default)]
    pub negative_points: Vec<String>,
    pub confidence: f64,
}

/// Oracle failures. Timeout, transport, and malformed output are handled
/// identically by the fallback policy.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("reasoning gateway timed out after {0}ms")]
    Timeout(u64),
    #[error("reasoning gateway transport failed: {0}")]
    Transport(String),
    #[error("reasoning gateway returned malformed output: {0}")]
    Malformed(String),
}

/// Narrow seam to the external reasoning oracle. The deterministic core works
/// correctly with or without an implementation behind it; callers apply the
/// timeout and substitute the documented fallback on any error.
pub trait ReasoningGateway: Send + Sync {
    fn analyze(
        &self,
        request: &GatewayRequest,
    ) -> impl Future<Output = Result<GatewayResponse, GatewayError>> + Send;
}

/// Placeholder gateway for deterministic deployments; the service never
/// dispatches to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGateway;

impl ReasoningGateway for NullGateway {
    async fn analyze(&self, _request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        Err(GatewayError::Transport(
            "no reasoning gateway configured".to_string(),
        ))
    }
}

/// A response is usable only when its score honors the range contract and
/// its confidence is a sane probability.
pub(crate) fn validate_response(
    request: &GatewayRequest,
    response: GatewayResponse,
) -> Result<GatewayResponse, GatewayError> {
    if !response.score.is_finite()
        || response.score < f64::from(request.score_min)
        || response.score > f64::from(request.score_max)
    {
        return Err(GatewayError::Malformed(format!(
            "score {} outside contract {}-{}",
            response.score, request.score_min, request.score_max
        )));
    }
    if !response.confidence.is_finite() || !(0.0..=1.0).contains(&response.confidence) {
        return Err(GatewayError::Malformed(format!(
            "confidence {} outside [0,1]",
            response.confidence
        )));
    }
    Ok(response)
}
