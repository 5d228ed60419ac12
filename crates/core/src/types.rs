use crate::error::{CampaignError, CampaignResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row of past campaign performance from the historical export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    /// Objective label exactly as it appears in the export.
    pub objective: String,
    pub spend: f64,
    pub impressions: f64,
    pub clicks: f64,
    pub results: f64,
    /// Conversions, when the export carries them separately from results.
    #[serde(default)]
    pub conversions: Option<f64>,
}

impl HistoricalRecord {
    pub fn new(objective: impl Into<String>, spend: f64, impressions: f64, clicks: f64, results: f64) -> Self {
        Self {
            objective: objective.into(),
            spend,
            impressions,
            clicks,
            results,
            conversions: None,
        }
    }

    /// Conversions attributed to this row; results stand in when the export has none.
    pub fn conversions_or_results(&self) -> f64 {
        self.conversions.unwrap_or(self.results)
    }
}

/// Historical average rates for one objective, or for the whole dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BaselineRates {
    /// Cost per thousand impressions.
    pub avg_cpm: f64,
    pub avg_cpc: f64,
    /// Click-through rate as a percentage.
    pub avg_ctr: f64,
    pub avg_cost_per_result: f64,
    /// Conversions per click as a percentage.
    pub avg_conversion_rate: f64,
}

/// Per-objective linear slopes, applied as `rate + trend * duration`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TrendCoefficients {
    #[serde(default)]
    pub cpc_trend: f64,
    #[serde(default)]
    pub cpm_trend: f64,
    #[serde(default)]
    pub ctr_trend: f64,
    #[serde(default)]
    pub conversion_rate_trend: f64,
}

// ─── Requests ───────────────────────────────────────────────────────────────

/// A number as sent by a form: either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    /// Parse into a finite float. Blank text yields `None`.
    pub fn to_f64(&self, field: &str) -> CampaignResult<Option<f64>> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed.parse::<f64>().map_err(|_| {
                    CampaignError::InvalidInput(format!("'{field}' must be numeric, got '{s}'"))
                })?
            }
        };

        if !value.is_finite() {
            return Err(CampaignError::InvalidInput(format!("'{field}' must be a finite number")));
        }
        Ok(Some(value))
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Estimation request exactly as received, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct RawEstimationRequest {
    pub objective: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub budget: Option<NumericInput>,
    #[schema(value_type = Option<u32>)]
    pub duration: Option<NumericInput>,
    #[schema(value_type = Option<f64>)]
    pub cpc: Option<NumericInput>,
    #[schema(value_type = Option<f64>)]
    pub cpm: Option<NumericInput>,
    #[schema(value_type = Option<f64>)]
    pub ctr: Option<NumericInput>,
    #[serde(rename = "conversionRate", alias = "conversion_rate")]
    #[schema(value_type = Option<f64>)]
    pub conversion_rate: Option<NumericInput>,
}

/// User-supplied rates. Only nonzero values are kept; `None` means "use the baseline".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateOverrides {
    pub cpc: Option<f64>,
    pub cpm: Option<f64>,
    pub ctr: Option<f64>,
    pub conversion_rate: Option<f64>,
}

impl RateOverrides {
    pub fn is_empty(&self) -> bool {
        self.cpc.is_none() && self.cpm.is_none() && self.ctr.is_none() && self.conversion_rate.is_none()
    }
}

/// A validated estimation request.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationRequest {
    pub objective: String,
    pub budget: f64,
    /// Campaign length in days; scales trend adjustments.
    pub duration: u32,
    pub overrides: RateOverrides,
}

impl EstimationRequest {
    pub fn new(objective: impl Into<String>, budget: f64, duration: u32) -> Self {
        Self {
            objective: objective.into(),
            budget,
            duration,
            overrides: RateOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: RateOverrides) -> Self {
        self.overrides = overrides;
        self
    }
}

impl TryFrom<RawEstimationRequest> for EstimationRequest {
    type Error = CampaignError;

    fn try_from(raw: RawEstimationRequest) -> CampaignResult<Self> {
        let mut missing = Vec::new();
        if raw.objective.is_none() {
            missing.push("objective");
        }
        if raw.budget.is_none() {
            missing.push("budget");
        }
        if raw.duration.is_none() {
            missing.push("duration");
        }
        let (Some(objective), Some(budget), Some(duration)) = (raw.objective, raw.budget, raw.duration)
        else {
            return Err(CampaignError::InvalidInput(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        };

        if objective.is_empty() {
            return Err(CampaignError::InvalidInput("'objective' must not be empty".to_string()));
        }

        let budget = budget
            .to_f64("budget")?
            .ok_or_else(|| CampaignError::InvalidInput("'budget' must not be empty".to_string()))?;
        if budget < 0.0 {
            return Err(CampaignError::InvalidInput("'budget' must be non-negative".to_string()));
        }

        let overrides = RateOverrides {
            cpc: parse_override(raw.cpc.as_ref(), "cpc")?,
            cpm: parse_override(raw.cpm.as_ref(), "cpm")?,
            ctr: parse_override(raw.ctr.as_ref(), "ctr")?,
            conversion_rate: parse_override(raw.conversion_rate.as_ref(), "conversionRate")?,
        };

        Ok(Self {
            objective,
            budget,
            duration: parse_duration(&duration)?,
            overrides,
        })
    }
}

fn parse_duration(input: &NumericInput) -> CampaignResult<u32> {
    let invalid = || CampaignError::InvalidInput("'duration' must be a non-negative whole number of days".to_string());
    match input {
        NumericInput::Number(n) => {
            if !n.is_finite() || *n < 0.0 || n.fract() != 0.0 || *n > f64::from(u32::MAX) {
                return Err(invalid());
            }
            Ok(*n as u32)
        }
        NumericInput::Text(s) => s.trim().parse::<u32>().map_err(|_| invalid()),
    }
}

fn parse_override(input: Option<&NumericInput>, field: &str) -> CampaignResult<Option<f64>> {
    let Some(value) = input.map(|v| v.to_f64(field)).transpose()?.flatten() else {
        return Ok(None);
    };
    if value < 0.0 {
        return Err(CampaignError::InvalidInput(format!("'{field}' must be non-negative")));
    }
    Ok((value != 0.0).then_some(value))
}

/// Spend prediction request (`/predict`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SpendQuery {
    pub objective: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub spend: Option<NumericInput>,
}

impl SpendQuery {
    /// Validate into `(objective, spend)`.
    pub fn validate(self) -> CampaignResult<(String, f64)> {
        let objective = self
            .objective
            .filter(|o| !o.is_empty())
            .ok_or_else(|| CampaignError::InvalidInput("'objective' is required".to_string()))?;
        let spend = self
            .spend
            .as_ref()
            .map(|s| s.to_f64("spend"))
            .transpose()?
            .flatten()
            .ok_or_else(|| CampaignError::InvalidInput("'spend' is required".to_string()))?;
        if spend < 0.0 {
            return Err(CampaignError::InvalidInput("'spend' must be non-negative".to_string()));
        }
        Ok((objective, spend))
    }
}

// ─── Results ────────────────────────────────────────────────────────────────

/// Predicted funnel metrics for a budget. Counts are whole numbers; rates and
/// costs are rounded to two decimals. Exactly one of the results/conversions
/// field groups is populated, depending on the estimation mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EstimationResult {
    pub estimated_reach: u64,
    pub estimated_impressions: u64,
    pub estimated_clicks: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_results: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_conversions: Option<u64>,
    pub cost_per_click: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_result: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_conversion: Option<f64>,
    pub ctr: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
}

impl EstimationResult {
    /// Results or conversions, whichever the estimate carries.
    pub fn outcome_count(&self) -> u64 {
        self.estimated_results.or(self.estimated_conversions).unwrap_or(0)
    }

    /// Cost per result or per conversion, whichever the estimate carries.
    pub fn cost_per_outcome(&self) -> f64 {
        self.cost_per_result.or(self.cost_per_conversion).unwrap_or(0.0)
    }
}

/// Output of a spend prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictedMetrics {
    pub predicted_results: u64,
    pub predicted_impressions: u64,
    pub predicted_coverage: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpendPrediction {
    Predicted(PredictedMetrics),
    /// The objective has no usable cost baseline.
    NotEnoughData,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawEstimationRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_accepts_numbers_and_numeric_strings() {
        let req = EstimationRequest::try_from(raw(
            r#"{"objective": "leads", "budget": "50.5", "duration": 7, "cpc": "", "ctr": 1.5}"#,
        ))
        .unwrap();
        assert_eq!(req.objective, "leads");
        assert!((req.budget - 50.5).abs() < f64::EPSILON);
        assert_eq!(req.duration, 7);
        assert_eq!(req.overrides.cpc, None);
        assert_eq!(req.overrides.ctr, Some(1.5));
    }

    #[test]
    fn test_zero_override_means_baseline() {
        let req = EstimationRequest::try_from(raw(
            r#"{"objective": "leads", "budget": 10, "duration": "0", "cpm": 0, "conversionRate": "0"}"#,
        ))
        .unwrap();
        assert!(req.overrides.is_empty());
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let err = EstimationRequest::try_from(raw(r#"{"objective": "leads"}"#)).unwrap_err();
        match err {
            CampaignError::InvalidInput(msg) => {
                assert!(msg.contains("budget"));
                assert!(msg.contains("duration"));
                assert!(!msg.contains("objective"));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_budget_is_invalid() {
        let err = EstimationRequest::try_from(raw(
            r#"{"objective": "leads", "budget": "lots", "duration": 1}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, CampaignError::InvalidInput(_)));
    }

    #[test]
    fn test_fractional_or_negative_duration_is_invalid() {
        for duration in [r#"2.5"#, r#"-1"#, r#""a week""#] {
            let json = format!(r#"{{"objective": "leads", "budget": 1, "duration": {duration}}}"#);
            let err = EstimationRequest::try_from(raw(&json)).unwrap_err();
            assert!(matches!(err, CampaignError::InvalidInput(_)), "duration {duration}");
        }
    }

    #[test]
    fn test_negative_override_is_invalid() {
        let err = EstimationRequest::try_from(raw(
            r#"{"objective": "leads", "budget": 1, "duration": 1, "cpm": -3}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, CampaignError::InvalidInput(_)));
    }

    #[test]
    fn test_spend_query_validation() {
        let query = SpendQuery {
            objective: Some("leads".to_string()),
            spend: Some("120".into()),
        };
        assert_eq!(query.validate().unwrap(), ("leads".to_string(), 120.0));

        let missing = SpendQuery {
            objective: Some("leads".to_string()),
            spend: None,
        };
        assert!(matches!(missing.validate(), Err(CampaignError::InvalidInput(_))));
    }

    #[test]
    fn test_result_serializes_only_active_outcome_fields() {
        let result = EstimationResult {
            estimated_results: Some(3),
            cost_per_result: Some(1.5),
            cpm: Some(10.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["estimated_results"], 3);
        assert!(json.get("estimated_conversions").is_none());
        assert!(json.get("conversion_rate").is_none());
    }
}
