use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use surete_ai::config::AppConfig;
use surete_ai::error::AppError;
use surete_ai::telemetry;
use surete_ai::workflows::assessment::{
    assessment_router, Evaluation, ReasoningResult, RiskAnalysisService, RiskContext,
};
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Security Posture Analyzer",
    about = "Score security questionnaires and reason over risk scenarios from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run an evidence-backed risk analysis over stored evaluations
    Risk {
        #[command(subcommand)]
        command: RiskCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum RiskCommand {
    /// Analyze one risk scenario against an evaluation history
    Analyze(RiskAnalyzeArgs),
}

#[derive(Args, Debug)]
struct RiskAnalyzeArgs {
    /// JSON file holding the evaluation records to analyze
    #[arg(long)]
    evaluations: PathBuf,
    /// Target asset under analysis
    #[arg(long)]
    target: String,
    /// Threat scenario under analysis
    #[arg(long)]
    scenario: String,
    /// Optional risk category hint
    #[arg(long)]
    category: Option<String>,
    /// Emit the raw JSON result instead of the rendered report
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Risk {
            command: RiskCommand::Analyze(args),
        } => run_risk_analysis(args).await,
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let service = Arc::new(RiskAnalysisService::deterministic());

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(assessment_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "security posture analyzer ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn load_evaluations(path: &PathBuf) -> Result<Vec<Evaluation>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

async fn run_risk_analysis(args: RiskAnalyzeArgs) -> Result<(), AppError> {
    let evaluations = load_evaluations(&args.evaluations)?;
    let context = RiskContext {
        target: args.target,
        scenario: args.scenario,
        category: args.category,
    };

    let service = RiskAnalysisService::deterministic();
    let result = service.analyze_risk(&context, &evaluations).await;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).map_err(AppError::Input)?
        );
    } else {
        render_risk_report(&context, &result);
    }

    Ok(())
}

fn render_risk_report(context: &RiskContext, result: &ReasoningResult) {
    println!("Risk analysis");
    println!("Target: {}", context.target);
    println!("Scenario: {}", context.scenario);

    println!("\nCriteria");
    for assessment in [&result.probability, &result.vulnerability, &result.impact] {
        println!(
            "- {}: {} (confidence {:.2})",
            assessment.criterion.label(),
            assessment.score,
            assessment.confidence
        );
        println!("  {}", assessment.explanation);
    }

    println!("\nOverall: {}", result.overall_assessment);

    if result.cross_evaluation_patterns.is_empty() {
        println!("\nPatterns: none detected");
    } else {
        println!("\nPatterns");
        for pattern in &result.cross_evaluation_patterns {
            println!("- [{:.2}] {}", pattern.strength, pattern.pattern);
        }
    }

    if !result.contextual_insights.is_empty() {
        println!("\nContext");
        for insight in &result.contextual_insights {
            println!("- {insight}");
        }
    }

    if !result.questionnaire_recommendations.is_empty() {
        println!("\nQuestionnaire gaps");
        for recommendation in &result.questionnaire_recommendations {
            println!("- {recommendation}");
        }
    }

    if !result.citation_report.is_valid {
        println!("\nCitation warnings");
        for issue in &result.citation_report.issues {
            println!("- {issue}");
        }
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_evaluations_rejects_malformed_json() {
        let dir = std::env::temp_dir().join("surete-ai-tests");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("broken.json");
        std::fs::write(&path, "{ not json").expect("write fixture");

        match load_evaluations(&path) {
            Err(AppError::Input(_)) => {}
            other => panic!("expected input error, got {other:?}"),
        }
    }

    #[test]
    fn load_evaluations_accepts_empty_history() {
        let dir = std::env::temp_dir().join("surete-ai-tests");
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("empty.json");
        std::fs::write(&path, "[]").expect("write fixture");

        let evaluations = load_evaluations(&path).expect("empty history parses");
        assert!(evaluations.is_empty());
    }
}
