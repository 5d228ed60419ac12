use serde::Deserialize;
use std::path::Path;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `CAMPAIGN_FORECAST__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// ─── Dataset Config ─────────────────────────────────────────────────────────

/// Location of the historical campaign export and the headers to look for in it.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: String,
    /// Worksheet to read; the first sheet when unset. Ignored for CSV files.
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default)]
    pub columns: ColumnHints,
}

/// Header hints for column discovery. Numeric columns match the first header
/// that contains the hint; the objective column must match exactly.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnHints {
    #[serde(default = "default_impressions_hint")]
    pub impressions: String,
    #[serde(default = "default_clicks_hint")]
    pub clicks: String,
    #[serde(default = "default_spend_hint")]
    pub spend: String,
    #[serde(default = "default_results_hint")]
    pub results: String,
    #[serde(default = "default_objective_column")]
    pub objective: String,
    #[serde(default)]
    pub conversions: Option<String>,
}

// ─── Forecast Config ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    #[serde(default)]
    pub mode: EstimationMode,
    #[serde(default)]
    pub unknown_objective: FallbackPolicy,
    /// Share of impressions assumed to reach unique viewers.
    #[serde(default = "default_reach_factor")]
    pub reach_factor: f64,
    /// JSON file with per-objective trend coefficients.
    #[serde(default)]
    pub trends_path: Option<String>,
    #[serde(default = "default_apply_trends")]
    pub apply_trends: bool,
}

/// Which secondary funnel metric an estimate reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimationMode {
    /// Results from the objective's historical cost per result.
    #[default]
    Results,
    /// Conversions from clicks and the conversion rate.
    Conversions,
}

/// What to do when a request names an objective with no baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Report all-zero metrics unless the request carries overrides.
    #[default]
    Zero,
    /// Use the baseline computed over every historical record.
    Overall,
}

impl std::str::FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zero" => Ok(Self::Zero),
            "overall" => Ok(Self::Overall),
            other => Err(format!("unknown fallback policy '{other}' (expected zero|overall)")),
        }
    }
}

// Default functions
fn default_node_id() -> String {
    "forecast-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    5000
}
fn default_static_dir() -> String {
    "static".to_string()
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_dataset_path() -> String {
    "static/data.xlsx".to_string()
}
fn default_impressions_hint() -> String {
    "Impressions".to_string()
}
fn default_clicks_hint() -> String {
    "Clics (tous)".to_string()
}
fn default_spend_hint() -> String {
    "Montant dépensé".to_string()
}
fn default_results_hint() -> String {
    "Résultats".to_string()
}
fn default_objective_column() -> String {
    "Indicateur de résultats".to_string()
}
fn default_reach_factor() -> f64 {
    0.7
}
fn default_apply_trends() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            sheet: None,
            columns: ColumnHints::default(),
        }
    }
}

impl Default for ColumnHints {
    fn default() -> Self {
        Self {
            impressions: default_impressions_hint(),
            clicks: default_clicks_hint(),
            spend: default_spend_hint(),
            results: default_results_hint(),
            objective: default_objective_column(),
            conversions: None,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            mode: EstimationMode::default(),
            unknown_objective: FallbackPolicy::default(),
            reach_factor: default_reach_factor(),
            trends_path: None,
            apply_trends: default_apply_trends(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            dataset: DatasetConfig::default(),
            forecast: ForecastConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then environment variables.
    /// Environment values win over the file.
    pub fn load(file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("CAMPAIGN_FORECAST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults_match_historical_export() {
        let config = AppConfig::default();
        assert_eq!(config.api.http_port, 5000);
        assert_eq!(config.dataset.columns.clicks, "Clics (tous)");
        assert_eq!(config.dataset.columns.objective, "Indicateur de résultats");
        assert!((config.forecast.reach_factor - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.forecast.unknown_objective, FallbackPolicy::Zero);
        assert_eq!(config.forecast.mode, EstimationMode::Results);
    }

    #[test]
    fn test_partial_forecast_section_keeps_defaults() {
        let forecast: ForecastConfig =
            serde_json::from_str(r#"{"mode": "conversions", "unknown_objective": "overall"}"#)
                .unwrap();
        assert_eq!(forecast.mode, EstimationMode::Conversions);
        assert_eq!(forecast.unknown_objective, FallbackPolicy::Overall);
        assert!(forecast.apply_trends);
        assert!(forecast.trends_path.is_none());
    }

    #[test]
    fn test_fallback_policy_from_str() {
        assert_eq!(FallbackPolicy::from_str("overall").unwrap(), FallbackPolicy::Overall);
        assert_eq!(FallbackPolicy::from_str("zero").unwrap(), FallbackPolicy::Zero);
        assert!(FallbackPolicy::from_str("Overall").is_err());
    }
}
