//! Per-objective linear trend coefficients for duration-adjusted estimates.
//!
//! Trends are not derived from the historical export; they are supplied as a
//! JSON object keyed by objective label:
//!
//! ```json
//! { "leads": { "cpc_trend": 0.01, "ctr_trend": -0.002 } }
//! ```

use campaign_core::types::TrendCoefficients;
use campaign_core::{CampaignError, CampaignResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct TrendTable {
    by_objective: HashMap<String, TrendCoefficients>,
}

impl TrendTable {
    pub fn from_path(path: &Path) -> CampaignResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CampaignError::Config(format!("cannot read trend file '{}': {e}", path.display()))
        })?;
        let table: Self = serde_json::from_str(&raw).map_err(|e| {
            CampaignError::Config(format!("invalid trend file '{}': {e}", path.display()))
        })?;
        info!(path = %path.display(), objectives = table.len(), "Trend coefficients loaded");
        Ok(table)
    }

    pub fn insert(&mut self, objective: impl Into<String>, coefficients: TrendCoefficients) {
        self.by_objective.insert(objective.into(), coefficients);
    }

    pub fn get(&self, objective: &str) -> Option<&TrendCoefficients> {
        self.by_objective.get(objective)
    }

    pub fn len(&self) -> usize {
        self.by_objective.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_objective.is_empty()
    }
}
