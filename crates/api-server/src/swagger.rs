//! OpenAPI specification and Swagger UI configuration.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campaign Forecast API",
        version = "0.1.0",
        description = "Estimates impressions, clicks, reach and results for a campaign budget from historical per-objective baselines.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Estimation", description = "Budget estimation and spend prediction"),
        (name = "Analysis", description = "Historical baselines"),
        (name = "Operations", description = "Health, readiness, and liveness probes"),
    ),
    paths(
        // Estimation
        crate::rest::handle_calculate,
        crate::rest::list_objectives,
        crate::rest::predict_query,
        crate::rest::predict_body,
        // Analysis
        crate::rest::analysis,
        crate::rest::reload_analysis,
        // Operations
        crate::rest::health_check,
        crate::rest::readiness,
        crate::rest::liveness,
    ),
    components(schemas(
        campaign_core::types::RawEstimationRequest,
        campaign_core::types::EstimationResult,
        campaign_core::types::SpendQuery,
        campaign_core::types::PredictedMetrics,
        campaign_core::types::BaselineRates,
        campaign_estimation::AnalysisReport,
        campaign_estimation::ObjectiveReport,
        campaign_estimation::ObjectiveMetrics,
        campaign_estimation::ObjectiveTotals,
        crate::rest::ReloadResponse,
        crate::rest::ErrorResponse,
        crate::rest::HealthResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_estimation_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/calculate", "/objectives", "/predict", "/analysis", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
