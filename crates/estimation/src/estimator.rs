//! Budget -> funnel estimation against a baseline snapshot.

use crate::aggregator::ratio;
use crate::snapshot::BaselineSnapshot;
use campaign_core::config::{EstimationMode, FallbackPolicy, ForecastConfig};
use campaign_core::types::{BaselineRates, EstimationRequest, EstimationResult, TrendCoefficients};
use campaign_core::{CampaignError, CampaignResult};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    pub mode: EstimationMode,
    pub fallback: FallbackPolicy,
    /// Share of impressions counted as unique reach.
    pub reach_factor: f64,
    pub apply_trends: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::from(&ForecastConfig::default())
    }
}

impl From<&ForecastConfig> for EstimatorConfig {
    fn from(config: &ForecastConfig) -> Self {
        Self {
            mode: config.mode,
            fallback: config.unknown_objective,
            reach_factor: config.reach_factor,
            apply_trends: config.apply_trends,
        }
    }
}

/// Rates an estimate is computed from, after overrides, fallback and trends.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectiveRates {
    pub cpc: f64,
    pub cpm: f64,
    pub ctr: f64,
    pub conversion_rate: f64,
    pub cost_per_result: f64,
}

pub struct Estimator {
    config: EstimatorConfig,
}

impl Estimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Resolve the rates for a request.
    ///
    /// Each rate is the request override when one is given, otherwise the
    /// objective's baseline, otherwise whatever the fallback policy allows.
    /// Cost per result never falls back: an unknown objective gets zero.
    /// Trend adjustment only touches baseline-derived rates.
    pub fn resolve_rates(
        &self,
        request: &EstimationRequest,
        snapshot: &BaselineSnapshot,
    ) -> CampaignResult<EffectiveRates> {
        let own = snapshot.objective(&request.objective).map(|metrics| metrics.rates);
        let baseline = match own {
            Some(rates) => Some(rates),
            None => match self.config.fallback {
                FallbackPolicy::Overall => Some(snapshot.overall().rates),
                FallbackPolicy::Zero => None,
            },
        };

        if baseline.is_none() && request.overrides.is_empty() {
            return Err(CampaignError::UnknownObjective(request.objective.clone()));
        }
        let baseline = baseline.unwrap_or_default();

        let trend: TrendCoefficients = if self.config.apply_trends {
            snapshot
                .trends()
                .get(&request.objective)
                .copied()
                .unwrap_or_default()
        } else {
            TrendCoefficients::default()
        };
        let days = f64::from(request.duration);

        let overrides = &request.overrides;
        Ok(EffectiveRates {
            cpc: overrides
                .cpc
                .unwrap_or(baseline.avg_cpc + trend.cpc_trend * days),
            cpm: overrides
                .cpm
                .unwrap_or(baseline.avg_cpm + trend.cpm_trend * days),
            ctr: overrides
                .ctr
                .unwrap_or(baseline.avg_ctr + trend.ctr_trend * days),
            conversion_rate: overrides
                .conversion_rate
                .unwrap_or(baseline.avg_conversion_rate + trend.conversion_rate_trend * days),
            cost_per_result: own.map_or(0.0, |rates| rates.avg_cost_per_result),
        })
    }

    /// Estimate funnel metrics for `request`.
    ///
    /// Fails with `UnknownObjective` when the objective has no baseline under
    /// the configured fallback policy and the request carries no overrides.
    pub fn estimate(
        &self,
        request: &EstimationRequest,
        snapshot: &BaselineSnapshot,
    ) -> CampaignResult<EstimationResult> {
        let rates = self.resolve_rates(request, snapshot)?;
        debug!(
            objective = %request.objective,
            budget = request.budget,
            duration = request.duration,
            cpm = rates.cpm,
            ctr = rates.ctr,
            cpc = rates.cpc,
            "Effective rates resolved"
        );
        Ok(self.compute(request.budget, &rates))
    }

    /// Like [`Estimator::estimate`], but an unknown objective yields all-zero metrics.
    pub fn estimate_or_empty(
        &self,
        request: &EstimationRequest,
        snapshot: &BaselineSnapshot,
    ) -> CampaignResult<EstimationResult> {
        match self.estimate(request, snapshot) {
            Err(CampaignError::UnknownObjective(objective)) => {
                warn!(objective = %objective, "No baseline for objective, returning empty metrics");
                metrics::counter!("forecast.unknown_objective").increment(1);
                Ok(self.empty_result())
            }
            other => other,
        }
    }

    /// All-zero result in the shape of the configured mode.
    pub fn empty_result(&self) -> EstimationResult {
        self.compute(0.0, &EffectiveRates::default())
    }

    fn compute(&self, budget: f64, rates: &EffectiveRates) -> EstimationResult {
        let impressions = if rates.cpm > 0.0 {
            budget / rates.cpm * 1000.0
        } else {
            0.0
        };

        // CTR wins over CPC whenever it is available.
        let clicks = if rates.ctr > 0.0 {
            impressions * (rates.ctr / 100.0)
        } else if rates.cpc > 0.0 {
            budget / rates.cpc
        } else {
            0.0
        };

        let outcomes = match self.config.mode {
            EstimationMode::Results => ratio(budget, rates.cost_per_result),
            EstimationMode::Conversions if rates.conversion_rate > 0.0 => {
                clicks * (rates.conversion_rate / 100.0)
            }
            EstimationMode::Conversions => 0.0,
        };

        let reach = impressions * self.config.reach_factor;
        let cost_per_click = round_money(ratio(budget, clicks));
        let cost_per_outcome = round_money(ratio(budget, outcomes));

        let mut result = EstimationResult {
            estimated_reach: round_count(reach),
            estimated_impressions: round_count(impressions),
            estimated_clicks: round_count(clicks),
            cost_per_click,
            ctr: round_money(rates.ctr),
            ..Default::default()
        };

        match self.config.mode {
            EstimationMode::Results => {
                result.estimated_results = Some(round_count(outcomes));
                result.cost_per_result = Some(cost_per_outcome);
                result.cpm = Some(round_money(rates.cpm));
            }
            EstimationMode::Conversions => {
                result.estimated_conversions = Some(round_count(outcomes));
                result.cost_per_conversion = Some(cost_per_outcome);
                result.conversion_rate = Some(round_money(rates.conversion_rate));
            }
        }
        result
    }
}

/// Nearest whole count, ties to even. NaN and negative values become zero;
/// values past `u64::MAX` (including infinity) saturate.
pub(crate) fn round_count(value: f64) -> u64 {
    if value > 0.0 {
        value.round_ties_even() as u64
    } else {
        0
    }
}

/// Two decimal places, ties to even.
pub(crate) fn round_money(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round_ties_even() / 100.0
    } else {
        0.0
    }
}

impl From<BaselineRates> for EffectiveRates {
    fn from(rates: BaselineRates) -> Self {
        Self {
            cpc: rates.avg_cpc,
            cpm: rates.avg_cpm,
            ctr: rates.avg_ctr,
            conversion_rate: rates.avg_conversion_rate,
            cost_per_result: rates.avg_cost_per_result,
        }
    }
}
