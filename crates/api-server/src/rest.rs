//! REST API handlers for estimation, spend prediction, analysis and operational endpoints.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use campaign_core::types::{
    EstimationRequest, EstimationResult, PredictedMetrics, RawEstimationRequest, SpendPrediction,
    SpendQuery,
};
use campaign_core::{AppConfig, CampaignError};
use campaign_estimation::{AnalysisReport, Estimator, EstimatorConfig, SnapshotStore, SpendPredictor};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use utoipa::ToSchema;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub snapshots: Arc<SnapshotStore>,
    pub estimator: Arc<Estimator>,
    pub predictor: Arc<SpendPredictor>,
    pub config: Arc<AppConfig>,
    pub node_id: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, snapshots: Arc<SnapshotStore>) -> Self {
        let estimator = Estimator::new(EstimatorConfig::from(&config.forecast));
        let predictor = SpendPredictor::new(config.forecast.reach_factor);
        Self {
            snapshots,
            estimator: Arc::new(estimator),
            predictor: Arc::new(predictor),
            node_id: config.node_id.clone(),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn reject(err: &CampaignError) -> ApiError {
    let (status, code) = match err {
        CampaignError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
        CampaignError::UnknownObjective(_) => (StatusCode::NOT_FOUND, "unknown_objective"),
        CampaignError::DataUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "data_unavailable"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    if err.is_client_error() {
        metrics::counter!("api.validation_errors").increment(1);
    }
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: err.to_string(),
        }),
    )
}

/// POST /calculate — Estimate funnel metrics for a budget.
#[utoipa::path(
    post,
    path = "/calculate",
    tag = "Estimation",
    request_body = RawEstimationRequest,
    responses(
        (status = 200, description = "Estimated metrics", body = EstimationResult),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
    )
)]
pub async fn handle_calculate(
    State(state): State<AppState>,
    payload: Result<Json<RawEstimationRequest>, JsonRejection>,
) -> Result<Json<EstimationResult>, ApiError> {
    let Json(raw) = payload.map_err(|e| {
        warn!(error = %e, "Estimation request rejected");
        reject(&CampaignError::InvalidInput(e.body_text()))
    })?;

    let request = EstimationRequest::try_from(raw).map_err(|e| {
        warn!(error = %e, "Estimation request validation failed");
        reject(&e)
    })?;

    let snapshot = state.snapshots.current();
    match state.estimator.estimate_or_empty(&request, &snapshot) {
        Ok(result) => {
            metrics::counter!("forecast.estimates").increment(1);
            Ok(Json(result))
        }
        Err(e) => {
            error!(error = %e, objective = %request.objective, "Estimation failed");
            Err(reject(&e))
        }
    }
}

/// GET /objectives — Objective labels known from the historical data.
#[utoipa::path(
    get,
    path = "/objectives",
    tag = "Estimation",
    responses(
        (status = 200, description = "Objective labels in order of discovery", body = Vec<String>),
    )
)]
pub async fn list_objectives(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.snapshots.current().objective_names())
}

/// GET /predict — Predict results from a spend amount (query string).
#[utoipa::path(
    get,
    path = "/predict",
    tag = "Estimation",
    params(
        ("objective" = String, Query, description = "Objective label"),
        ("spend" = f64, Query, description = "Amount to spend"),
    ),
    responses(
        (status = 200, description = "Prediction, or an error message when the objective lacks data", body = PredictedMetrics),
        (status = 400, description = "Missing or malformed parameters", body = ErrorResponse),
    )
)]
pub async fn predict_query(
    State(state): State<AppState>,
    query: Result<Query<SpendQuery>, QueryRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Query(query) = query.map_err(|e| reject(&CampaignError::InvalidInput(e.body_text())))?;
    predict(&state, query)
}

/// POST /predict — Predict results from a spend amount (JSON body).
#[utoipa::path(
    post,
    path = "/predict",
    tag = "Estimation",
    request_body = SpendQuery,
    responses(
        (status = 200, description = "Prediction, or an error message when the objective lacks data", body = PredictedMetrics),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
    )
)]
pub async fn predict_body(
    State(state): State<AppState>,
    payload: Result<Json<SpendQuery>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(query) = payload.map_err(|e| reject(&CampaignError::InvalidInput(e.body_text())))?;
    predict(&state, query)
}

fn predict(state: &AppState, query: SpendQuery) -> Result<Json<PredictResponse>, ApiError> {
    let (objective, spend) = query.validate().map_err(|e| reject(&e))?;
    let snapshot = state.snapshots.current();

    metrics::counter!("forecast.predictions").increment(1);
    let response = match state.predictor.predict(&objective, spend, &snapshot) {
        SpendPrediction::Predicted(predicted) => PredictResponse::Metrics(predicted),
        SpendPrediction::NotEnoughData => PredictResponse::NotEnoughData {
            error: format!("No data available for objective: {objective}"),
        },
    };
    Ok(Json(response))
}

/// GET /analysis — Aggregated historical baselines.
#[utoipa::path(
    get,
    path = "/analysis",
    tag = "Analysis",
    responses(
        (status = 200, description = "Overall and per-objective baselines", body = AnalysisReport),
    )
)]
pub async fn analysis(State(state): State<AppState>) -> Json<AnalysisReport> {
    Json(state.snapshots.current().report())
}

/// POST /analysis/reload — Re-read the dataset and publish fresh baselines.
/// The previous snapshot stays in place if loading fails.
#[utoipa::path(
    post,
    path = "/analysis/reload",
    tag = "Analysis",
    responses(
        (status = 200, description = "New snapshot published", body = ReloadResponse),
        (status = 503, description = "Dataset could not be loaded", body = ErrorResponse),
    )
)]
pub async fn reload_analysis(State(state): State<AppState>) -> Result<Json<ReloadResponse>, ApiError> {
    let config = state.config.clone();
    let built = tokio::task::spawn_blocking(move || campaign_ingest::build_snapshot(&config))
        .await
        .map_err(|e| reject(&CampaignError::Internal(e.into())))?;

    match built {
        Ok(snapshot) => {
            let response = ReloadResponse {
                objectives: snapshot.objective_names().len(),
                record_count: snapshot.record_count(),
            };
            state.snapshots.publish(snapshot);
            metrics::counter!("forecast.snapshot_reloads").increment(1);
            info!(objectives = response.objectives, records = response.record_count, "Baselines reloaded");
            Ok(Json(response))
        }
        Err(e) => {
            error!(error = %e, "Baseline reload failed, keeping previous snapshot");
            Err(reject(&e))
        }
    }
}

/// GET /health — Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Operations",
    responses(
        (status = 200, description = "Service health", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.snapshots.current();
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        objectives: snapshot.objective_names().len(),
    })
}

/// GET /ready — Readiness probe. Ready once baselines hold at least one record.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Operations",
    responses(
        (status = 200, description = "Ready"),
        (status = 503, description = "Not ready"),
    )
)]
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.snapshots.current().record_count() > 0 {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /live — Liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses(
        (status = 200, description = "Alive"),
    )
)]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Spend prediction outcome; "not enough data" is reported in-band.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Metrics(PredictedMetrics),
    NotEnoughData { error: String },
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReloadResponse {
    pub objectives: usize,
    pub record_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
    pub objectives: usize,
}
