use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{Json, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::advisor::{Advisor, SIMULATION_ADVICE, advice_or_fallback, build_context};
use crate::core::{
    Assessment, FinancialProfile, ProjectionPair, RatioSummary, RiskZone, SimulationOverrides,
    assess_profile, simulate_profile,
};

const ROOT_MESSAGE: &str = "Financial Stability Advisor API is running";

#[derive(Clone)]
struct AppState {
    advisor: Arc<dyn Advisor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: f64,
    pub risk_zone: RiskZone,
    pub ratios: RatioSummary,
    pub projection: ProjectionPair,
    #[serde(rename = "ai_advice")]
    pub advisory_text: String,
}

impl AnalysisResult {
    fn from_assessment(assessment: &Assessment, advisory_text: String) -> Self {
        Self {
            score: assessment.score,
            risk_zone: assessment.risk_zone,
            ratios: assessment.ratios.summary(),
            projection: assessment.projection,
            advisory_text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SimulatePayload {
    current_data: FinancialProfile,
    #[serde(default)]
    changes: SimulationOverrides,
}

#[derive(Debug, Serialize)]
struct RootResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Scores the profile and asks the advisor for text. Advisor problems end up
/// as fallback text, never as an error.
pub async fn analyze(profile: &FinancialProfile, advisor: &dyn Advisor) -> AnalysisResult {
    let assessment = assess_profile(profile);
    let context = build_context(profile, &assessment.ratios.summary());
    let advice = advice_or_fallback(advisor, &context, assessment.risk_zone).await;
    AnalysisResult::from_assessment(&assessment, advice)
}

/// Same pipeline on the overridden profile; the advisor is not consulted.
pub fn simulate(profile: &FinancialProfile, overrides: &SimulationOverrides) -> AnalysisResult {
    let (_, assessment) = simulate_profile(profile, overrides);
    AnalysisResult::from_assessment(&assessment, SIMULATION_ADVICE.to_string())
}

pub fn router(advisor: Arc<dyn Advisor>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/analyze", post(analyze_handler))
        .route("/simulate", post(simulate_handler))
        .fallback(not_found_handler)
        .with_state(AppState { advisor })
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run_http_server(addr: SocketAddr, advisor: Arc<dyn Advisor>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "financial stability API listening");

    axum::serve(listener, router(advisor))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to install CTRL+C handler");
            }
            info!("shutting down gracefully");
        })
        .await
}

async fn root_handler() -> Response {
    json_response(
        StatusCode::OK,
        RootResponse {
            message: ROOT_MESSAGE,
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn analyze_handler(
    State(state): State<AppState>,
    payload: Result<Json<FinancialProfile>, JsonRejection>,
) -> Response {
    let profile = match payload {
        Ok(Json(profile)) => profile,
        Err(rejection) => return rejection_response(rejection),
    };

    let result = analyze(&profile, state.advisor.as_ref()).await;
    debug!(zone = %result.risk_zone, score = result.score, "analysis complete");
    json_response(StatusCode::OK, result)
}

async fn simulate_handler(payload: Result<Json<SimulatePayload>, JsonRejection>) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => return rejection_response(rejection),
    };

    let result = simulate(&payload.current_data, &payload.changes);
    debug!(zone = %result.risk_zone, score = result.score, "simulation complete");
    json_response(StatusCode::OK, result)
}

fn rejection_response(rejection: JsonRejection) -> Response {
    debug!(error = %rejection.body_text(), "rejected request body");
    error_response(rejection.status(), &rejection.body_text())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
