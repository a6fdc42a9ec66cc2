use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use super::analysis::ReasoningGateway;
use super::domain::{Evaluation, EvaluationResponse, RiskContext};
use super::service::RiskAnalysisService;

/// Scoring request: one evaluation's responses plus its sector.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    pub sector: String,
    pub responses: Vec<EvaluationResponse>,
}

/// Analysis request: the risk context and the materialized evaluation
/// history it should be judged against.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub context: RiskContext,
    pub evaluations: Vec<Evaluation>,
}

/// Router builder exposing the scoring and risk-analysis endpoints.
pub fn assessment_router<G>(service: Arc<RiskAnalysisService<G>>) -> Router
where
    G: ReasoningGateway + 'static,
{
    Router::new()
        .route("/api/v1/assessments/score", post(score_handler::<G>))
        .route("/api/v1/risk/analysis", post(analyze_handler::<G>))
        .with_state(service)
}

pub(crate) async fn score_handler<G>(
    State(service): State<Arc<RiskAnalysisService<G>>>,
    Json(request): Json<ScoreRequest>,
) -> Response
where
    G: ReasoningGateway + 'static,
{
    let result = service.score_evaluation(&request.responses, &request.sector);
    (StatusCode::OK, Json(result)).into_response()
}

pub(crate) async fn analyze_handler<G>(
    State(service): State<Arc<RiskAnalysisService<G>>>,
    Json(request): Json<AnalyzeRequest>,
) -> Response
where
    G: ReasoningGateway + 'static,
{
    let result = service
        .analyze_risk(&request.context, &request.evaluations)
        .await;
    (StatusCode::OK, Json(result)).into_response()
}
