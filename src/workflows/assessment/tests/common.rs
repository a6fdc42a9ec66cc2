use std::sync::Arc;

use chrono::{TimeZone, Utc};

use crate::config::GatewayConfig;
use crate::workflows::assessment::analysis::{
    GatewayError, GatewayRequest, GatewayResponse, NullGateway, ReasoningGateway,
};
use crate::workflows::assessment::domain::{
    Evaluation, EvaluationId, EvaluationResponse, EvaluationStatus, ResponseValue, RiskContext,
};
use crate::workflows::assessment::scoring::{ScoringConfig, ScoringEngine};
use crate::workflows::assessment::service::RiskAnalysisService;
use crate::workflows::assessment::taxonomy::CategoryRuleTable;

pub(super) fn bool_response(id: &str, text: &str, answer: bool) -> EvaluationResponse {
    EvaluationResponse {
        question_id: id.to_string(),
        question_text: text.to_string(),
        value: ResponseValue::Boolean(answer),
        facility_score: None,
        constraint_score: None,
        comment: None,
    }
}

pub(super) fn scored_response(
    id: &str,
    text: &str,
    answer: bool,
    facility: u8,
    constraint: u8,
) -> EvaluationResponse {
    EvaluationResponse {
        question_id: id.to_string(),
        question_text: text.to_string(),
        value: ResponseValue::Boolean(answer),
        facility_score: Some(facility),
        constraint_score: Some(constraint),
        comment: None,
    }
}

pub(super) fn pct_response(id: &str, text: &str, value: f64) -> EvaluationResponse {
    EvaluationResponse {
        question_id: id.to_string(),
        question_text: text.to_string(),
        value: ResponseValue::Number(value),
        facility_score: None,
        constraint_score: None,
        comment: None,
    }
}

pub(super) fn text_response(id: &str, text: &str, answer: &str) -> EvaluationResponse {
    EvaluationResponse {
        question_id: id.to_string(),
        question_text: text.to_string(),
        value: ResponseValue::Text(answer.to_string()),
        facility_score: None,
        constraint_score: None,
        comment: None,
    }
}

pub(super) fn completed_evaluation(
    id: &str,
    title: &str,
    sector: &str,
    total_score: f64,
    day: u32,
    responses: Vec<EvaluationResponse>,
) -> Evaluation {
    Evaluation {
        id: EvaluationId(id.to_string()),
        title: title.to_string(),
        status: EvaluationStatus::Completed,
        total_score: Some(total_score),
        risk_level: None,
        sector: sector.to_string(),
        company_size: None,
        completed_at: Some(
            Utc.with_ymd_and_hms(2025, 6, day, 9, 0, 0)
                .single()
                .expect("valid timestamp"),
        ),
        responses,
    }
}

/// Four completed site audits where the backup generator question is a
/// recurring negative answer.
pub(super) fn power_history() -> Vec<Evaluation> {
    let generator = |answer| {
        bool_response(
            "q-gen",
            "Disposez-vous d'un groupe électrogène de secours ?",
            answer,
        )
    };
    let surveillance = |answer| {
        bool_response(
            "q-cam",
            "Disposez-vous d'un système de surveillance vidéo ?",
            answer,
        )
    };
    let access = |answer| {
        bool_response(
            "q-acc",
            "Un contrôle d'accès par badge est-il en place ?",
            answer,
        )
    };

    vec![
        completed_evaluation(
            "eval-1",
            "Audit site Nord",
            "industrie",
            72.0,
            1,
            vec![generator(false), surveillance(true), access(true)],
        ),
        completed_evaluation(
            "eval-2",
            "Audit site Sud",
            "industrie",
            68.0,
            8,
            vec![generator(false), surveillance(true), access(true)],
        ),
        completed_evaluation(
            "eval-3",
            "Audit site Est",
            "services",
            75.0,
            15,
            vec![generator(true), surveillance(true), access(false)],
        ),
        completed_evaluation(
            "eval-4",
            "Audit site Ouest",
            "industrie",
            70.0,
            22,
            vec![generator(false), surveillance(false), access(true)],
        ),
    ]
}

pub(super) fn power_context() -> RiskContext {
    RiskContext {
        target: "alimentation électrique du site".to_string(),
        scenario: "panne de courant prolongée".to_string(),
        category: None,
    }
}

pub(super) fn theft_context() -> RiskContext {
    RiskContext {
        target: "flotte de véhicules".to_string(),
        scenario: "vol sur le parking".to_string(),
        category: None,
    }
}

pub(super) fn scoring_engine() -> ScoringEngine {
    ScoringEngine::new(ScoringConfig::default(), CategoryRuleTable::default())
}

pub(super) fn deterministic_service() -> RiskAnalysisService<NullGateway> {
    RiskAnalysisService::deterministic()
}

pub(super) fn fast_gateway_config() -> GatewayConfig {
    GatewayConfig {
        timeout_ms: 200,
        retry_delay_ms: 5,
    }
}

/// Oracle stub answering at the top of the requested range.
pub(super) struct CeilingGateway;

impl ReasoningGateway for CeilingGateway {
    async fn analyze(&self, request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        Ok(GatewayResponse {
            score: f64::from(request.score_max),
            explanation: format!("refined {} judgment", request.criterion.label()),
            positive_points: vec!["external corroboration".to_string()],
            negative_points: Vec::new(),
            confidence: 0.9,
        })
    }
}

/// Oracle stub that always fails at the transport layer.
pub(super) struct FailingGateway;

impl ReasoningGateway for FailingGateway {
    async fn analyze(&self, _request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        Err(GatewayError::Transport("connection refused".to_string()))
    }
}

/// Oracle stub violating the score-range contract.
pub(super) struct OutOfRangeGateway;

impl ReasoningGateway for OutOfRangeGateway {
    async fn analyze(&self, _request: &GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        Ok(GatewayResponse {
            score: 99.0,
            explanation: "nonsense".to_string(),
            positive_points: Vec::new(),
            negative_points: Vec::new(),
            confidence: 0.9,
        })
    }
}

pub(super) fn gateway_service<G>(gateway: G) -> RiskAnalysisService<G>
where
    G: ReasoningGateway + 'static,
{
    RiskAnalysisService::new(
        ScoringConfig::default(),
        CategoryRuleTable::default(),
        Some(Arc::new(gateway)),
        fast_gateway_config(),
    )
}
